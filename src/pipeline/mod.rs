//! Conversion delegates and the building blocks they share.
//!
//! Each delegate performs exactly one (input, output) transformation and
//! writes only through [`crate::output::StagedFile`] / [`crate::output::StagedDir`].
//!
//! ## Delegates
//!
//! ```text
//! jpg/jpeg/png ──▶ raster::image_to_image ──▶ jpg/jpeg/png
//! jpg/jpeg/png ──▶ raster::image_to_pdf  ──▶ pdf
//! pdf ──▶ render::pdf_to_images ──▶ <n>.jpg | <n>.png …
//! pdf ──▶ text ──▶ docx::pdf_to_docx ──▶ docx
//! pdf ──▶ text ──▶ tables ──▶ xlsx::pdf_to_xlsx ──▶ xlsx
//! xlsx ──▶ sheet::xlsx_to_csv ──▶ csv
//! docx/pptx ──▶ office::office_to_pdf (LibreOffice) ──▶ pdf
//! ```
//!
//! 1. [`encode`]: flatten alpha and encode a `DynamicImage` as JPEG/PNG
//! 2. [`render`]: bind pdfium, open documents, rasterise pages
//! 3. [`text`]: positioned text segments grouped into lines
//! 4. [`tables`]: table detection over those lines

pub mod docx;
pub mod encode;
pub mod office;
pub mod raster;
pub mod render;
pub mod sheet;
pub mod tables;
pub mod text;
pub mod xlsx;

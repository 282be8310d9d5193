//! # universal-convert
//!
//! Convert images, PDFs and office documents between formats, and cut page
//! ranges out of PDFs.
//!
//! ## Supported conversions
//!
//! | Input            | Outputs                         |
//! |------------------|---------------------------------|
//! | `jpg`            | `png`, `jpeg`, `pdf`            |
//! | `jpeg`           | `jpg`, `png`, `pdf`             |
//! | `png`            | `jpg`, `jpeg`, `pdf`            |
//! | `pdf`            | `jpg`, `jpeg`, `png`, `docx`, `xlsx` |
//! | `docx`           | `pdf` (needs LibreOffice)       |
//! | `xlsx`           | `csv`                           |
//! | `pptx`           | `pdf` (needs LibreOffice)       |
//!
//! Any other pair is answered with [`ConversionOutcome::Unsupported`]; it is
//! not an error.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ConversionRequest
//!  │
//!  ├─ 1. Validate  input exists, extension is a known input format
//!  ├─ 2. Resolve   (input, output) → Delegate via CAPABILITY_MATRIX
//!  ├─ 3. Platform  native renderer present for docx/pptx → pdf?
//!  ├─ 4. Delegate  decode / render / extract / encode into a staging area
//!  └─ 5. Commit    staged output renamed over the destination
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use universal_convert::{ConversionRequest, Converter, ConverterConfig, FormatTag};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(ConverterConfig::default());
//!     let request = ConversionRequest::new("scan.png", "scan.pdf", FormatTag::Pdf);
//!     let outcome = converter.convert(&request)?;
//!     println!("{}", outcome.message());
//!
//!     let pages = universal_convert::slice("report.pdf", "2", "4", "report_pages_2_to_4.pdf")?;
//!     println!("{}", pages.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `uconvert` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! universal-convert = { version = "0.1", default-features = false }
//! ```
//!
//! ## Native libraries
//!
//! PDF rasterisation and PDF text extraction load the pdfium shared library
//! at run time (`PDFIUM_LIB_PATH`, then the system loader). docx/pptx → pdf
//! runs a headless LibreOffice (`UCONVERT_SOFFICE`, then `PATH`). Everything
//! else, page slicing included, is pure Rust.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod platform;
pub mod slice;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use convert::{convert, ConversionRequest, Converter};
pub use error::{ConvertError, FailureKind};
pub use format::{capabilities_for, resolve, Delegate, FormatTag, NativeRenderer, CAPABILITY_MATRIX};
pub use output::{ConversionOutcome, ConvertedOutput};
pub use paths::{default_output_path, default_slice_output_path, derive_output_path, OutputPathSuggester};
pub use platform::Platform;
pub use slice::{check_request as check_slice_request, slice, slice_range, PageRange};

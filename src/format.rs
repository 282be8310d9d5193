//! Format tags and the static capability matrix.
//!
//! The matrix is data, not control flow: [`CAPABILITY_MATRIX`] lists, for each
//! input format, the reachable outputs *and* the delegate that performs each
//! conversion. Both the list the UI offers ([`capabilities_for`]) and the
//! dispatcher's lookup ([`resolve`]) read the same table, so adding a pair is
//! a one-line change and the two can never disagree.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Canonical identifier of a supported file format.
///
/// Parsing is case-insensitive and tolerates a leading dot (`".PNG"`);
/// [`FormatTag::as_str`] always yields the lower-case form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Jpg,
    Jpeg,
    Png,
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Csv,
}

impl FormatTag {
    /// Every tag, in declaration order.
    pub const ALL: [FormatTag; 8] = [
        FormatTag::Jpg,
        FormatTag::Jpeg,
        FormatTag::Png,
        FormatTag::Pdf,
        FormatTag::Docx,
        FormatTag::Xlsx,
        FormatTag::Pptx,
        FormatTag::Csv,
    ];

    /// Lower-case tag, also used as the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatTag::Jpg => "jpg",
            FormatTag::Jpeg => "jpeg",
            FormatTag::Png => "png",
            FormatTag::Pdf => "pdf",
            FormatTag::Docx => "docx",
            FormatTag::Xlsx => "xlsx",
            FormatTag::Pptx => "pptx",
            FormatTag::Csv => "csv",
        }
    }

    /// Encoder identifier for this tag.
    ///
    /// `jpg` has no encoder of its own and maps to `JPEG`; every other tag
    /// maps to its upper-cased form.
    pub fn encoder_name(self) -> &'static str {
        match self {
            FormatTag::Jpg | FormatTag::Jpeg => "JPEG",
            FormatTag::Png => "PNG",
            FormatTag::Pdf => "PDF",
            FormatTag::Docx => "DOCX",
            FormatTag::Xlsx => "XLSX",
            FormatTag::Pptx => "PPTX",
            FormatTag::Csv => "CSV",
        }
    }

    /// The `image` crate codec for raster tags, `None` for documents.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self.encoder_name() {
            "JPEG" => Some(image::ImageFormat::Jpeg),
            "PNG" => Some(image::ImageFormat::Png),
            _ => None,
        }
    }

    /// `true` for jpg, jpeg and png.
    pub fn is_image(self) -> bool {
        self.image_format().is_some()
    }

    /// `true` when at least one conversion starts from this format.
    pub fn is_input(self) -> bool {
        !routes_for(self).is_empty()
    }

    /// Lower-cased extension of `path` without the leading dot (`""` if none).
    pub fn extension_of(path: &Path) -> String {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Tag of an *input* file, judged by its extension alone.
    pub fn from_input_path(path: &Path) -> Result<FormatTag, ConvertError> {
        let ext = FormatTag::extension_of(path);
        match ext.parse::<FormatTag>() {
            Ok(tag) if tag.is_input() => Ok(tag),
            _ => Err(ConvertError::unsupported_extension(&ext)),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s.trim().trim_start_matches('.').to_ascii_lowercase();
        FormatTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == canonical)
            .ok_or_else(|| ConvertError::unknown_format(s))
    }
}

/// Identifier of a leaf conversion procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delegate {
    /// Decode an image and re-encode it with another codec.
    ImageToImage,
    /// Wrap one image as a single-page PDF.
    ImageToPdf,
    /// Rasterise every PDF page into its own image file.
    PdfToImages,
    /// Rebuild the PDF's text as a Word document.
    PdfToDocx,
    /// Extract detected tables into workbook sheets.
    PdfToXlsx,
    /// Render a Word document through the native office renderer.
    DocxToPdf,
    /// Write the first worksheet as CSV.
    XlsxToCsv,
    /// Render a presentation through the native office renderer.
    PptxToPdf,
}

/// Which native application family a platform-constrained delegate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeRenderer {
    /// Word-processing documents.
    Document,
    /// Slide decks.
    Presentation,
}

impl Delegate {
    /// The native renderer this delegate needs, if any.
    pub fn native_renderer(self) -> Option<NativeRenderer> {
        match self {
            Delegate::DocxToPdf => Some(NativeRenderer::Document),
            Delegate::PptxToPdf => Some(NativeRenderer::Presentation),
            _ => None,
        }
    }

    /// `true` when the delegate produces one file per page.
    pub fn is_multi_file(self) -> bool {
        matches!(self, Delegate::PdfToImages)
    }
}

impl fmt::Display for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delegate::ImageToImage => "image→image conversion",
            Delegate::ImageToPdf => "image→pdf conversion",
            Delegate::PdfToImages => "pdf→image rasterisation",
            Delegate::PdfToDocx => "pdf→docx reconstruction",
            Delegate::PdfToXlsx => "pdf→xlsx table extraction",
            Delegate::DocxToPdf => "docx→pdf rendering",
            Delegate::XlsxToCsv => "xlsx→csv export",
            Delegate::PptxToPdf => "pptx→pdf rendering",
        };
        f.write_str(name)
    }
}

/// Reachable outputs of one input format, in the order offered to users.
#[derive(Debug)]
pub struct Capability {
    pub input: FormatTag,
    pub routes: &'static [(FormatTag, Delegate)],
}

use Delegate as D;
use FormatTag as F;

/// The process-wide capability matrix.
pub const CAPABILITY_MATRIX: &[Capability] = &[
    Capability {
        input: F::Jpg,
        routes: &[
            (F::Png, D::ImageToImage),
            (F::Jpeg, D::ImageToImage),
            (F::Pdf, D::ImageToPdf),
        ],
    },
    Capability {
        input: F::Jpeg,
        routes: &[
            (F::Jpg, D::ImageToImage),
            (F::Png, D::ImageToImage),
            (F::Pdf, D::ImageToPdf),
        ],
    },
    Capability {
        input: F::Png,
        routes: &[
            (F::Jpg, D::ImageToImage),
            (F::Jpeg, D::ImageToImage),
            (F::Pdf, D::ImageToPdf),
        ],
    },
    Capability {
        input: F::Pdf,
        routes: &[
            (F::Jpg, D::PdfToImages),
            (F::Jpeg, D::PdfToImages),
            (F::Png, D::PdfToImages),
            (F::Docx, D::PdfToDocx),
            (F::Xlsx, D::PdfToXlsx),
        ],
    },
    Capability {
        input: F::Docx,
        routes: &[(F::Pdf, D::DocxToPdf)],
    },
    Capability {
        input: F::Xlsx,
        routes: &[(F::Csv, D::XlsxToCsv)],
    },
    Capability {
        input: F::Pptx,
        routes: &[(F::Pdf, D::PptxToPdf)],
    },
];

/// Routes starting at `input`; empty for output-only tags.
pub fn routes_for(input: FormatTag) -> &'static [(FormatTag, Delegate)] {
    CAPABILITY_MATRIX
        .iter()
        .find(|c| c.input == input)
        .map(|c| c.routes)
        .unwrap_or(&[])
}

/// Ordered list of output formats reachable from `input`.
pub fn capabilities_for(input: FormatTag) -> Vec<FormatTag> {
    routes_for(input).iter().map(|(out, _)| *out).collect()
}

/// Delegate for a pair, or `None` when the matrix does not connect them.
pub fn resolve(input: FormatTag, output: FormatTag) -> Option<Delegate> {
    routes_for(input)
        .iter()
        .find(|(out, _)| *out == output)
        .map(|(_, d)| *d)
}

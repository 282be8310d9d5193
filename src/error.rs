//! Error types for the universal-convert library.
//!
//! Every failure surfaces as a [`ConvertError`]. Callers that need to decide
//! *how* to present a failure ask [`ConvertError::kind`], which sorts the
//! variants into three buckets:
//!
//! * [`FailureKind::Validation`]: the request itself is wrong (missing file,
//!   unknown extension, malformed page range). Detected before any delegate
//!   runs, so nothing has been written.
//!
//! * [`FailureKind::Delegate`]: a codec, rasteriser or writer failed while
//!   doing the work. The original message is kept in the error text.
//!
//! * [`FailureKind::PlatformUnavailable`]: the conversion needs a native
//!   application that this host does not have. A UI should explain the
//!   platform constraint instead of reporting a generic failure.
//!
//! An unsupported (input, output) pair is *not* an error; it is reported as
//! [`crate::output::ConversionOutcome::Unsupported`].

use crate::format::{Delegate, FormatTag};
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad input file, extension, format tag, page range or configuration.
    Validation,
    /// The underlying codec / renderer / writer failed.
    Delegate,
    /// A required native application is not installed on this host.
    PlatformUnavailable,
}

/// All errors returned by the universal-convert library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Input path does not exist, is not a regular file, or cannot be read.
    #[error("invalid file: '{path}' ({reason})")]
    InvalidFile { path: PathBuf, reason: String },

    /// The input extension is not one of the accepted input formats.
    #[error("unsupported format: .{ext}")]
    UnsupportedFormat { ext: String },

    /// A format tag string did not name any known format.
    #[error("unknown format tag '{tag}'\nKnown tags: jpg, jpeg, png, pdf, docx, xlsx, pptx, csv")]
    UnknownFormat { tag: String },

    /// Start or end page is not an integer.
    #[error("start and end page must be integers (got start={start:?}, end={end:?})")]
    NonIntegerPage { start: String, end: String },

    /// `start < 1` or `end < start`.
    #[error("invalid page range: {start}-{end}\nPages are 1-based and the end page must not precede the start page.")]
    InvalidPageRange { start: i64, end: i64 },

    /// The range asks for pages beyond the end of the document.
    #[error("page range {start}-{end} exceeds document length ({total} pages)")]
    PageOutOfRange { start: u32, end: u32, total: u32 },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Delegate errors ───────────────────────────────────────────────────
    /// A delegate raised while decoding, rendering or encoding.
    #[error("{delegate} failed: {detail}")]
    Delegate { delegate: Delegate, detail: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt or unreadable: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password that was not supplied (or was wrong).
    #[error("PDF '{path}' is encrypted.\nProvide the password with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// pdf→xlsx found nothing tabular anywhere in the document.
    #[error("no tables found in '{path}'")]
    NoTablesFound { path: PathBuf },

    /// pdfium returned an error for a specific page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not create or write an output file or directory.
    #[error("failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "failed to bind to pdfium library: {0}\n\n\
Rasterising and reading PDF text needs the pdfium shared library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Or install libpdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Platform errors ───────────────────────────────────────────────────
    /// The conversion needs a native renderer that is not installed.
    #[error("{renderer} is not available on this platform.\n{hint}")]
    PlatformUnavailable { renderer: String, hint: String },
}

impl ConvertError {
    /// Classify this error for presentation.
    pub fn kind(&self) -> FailureKind {
        match self {
            ConvertError::InvalidFile { .. }
            | ConvertError::UnsupportedFormat { .. }
            | ConvertError::UnknownFormat { .. }
            | ConvertError::NonIntegerPage { .. }
            | ConvertError::InvalidPageRange { .. }
            | ConvertError::PageOutOfRange { .. }
            | ConvertError::InvalidConfig(_) => FailureKind::Validation,
            ConvertError::PlatformUnavailable { .. } => FailureKind::PlatformUnavailable,
            ConvertError::Delegate { .. }
            | ConvertError::CorruptPdf { .. }
            | ConvertError::PasswordRequired { .. }
            | ConvertError::NoTablesFound { .. }
            | ConvertError::RasterisationFailed { .. }
            | ConvertError::OutputWriteFailed { .. }
            | ConvertError::PdfiumBindingFailed(_) => FailureKind::Delegate,
        }
    }

    /// Wrap any displayable delegate failure, keeping its message.
    pub(crate) fn delegate(delegate: Delegate, detail: impl std::fmt::Display) -> Self {
        ConvertError::Delegate {
            delegate,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported_extension(ext: &str) -> Self {
        ConvertError::UnsupportedFormat {
            ext: ext.to_ascii_lowercase(),
        }
    }

    pub(crate) fn unknown_format(tag: &str) -> Self {
        ConvertError::UnknownFormat {
            tag: tag.to_string(),
        }
    }

    pub(crate) fn platform_unavailable(output: FormatTag, renderer: &str, hint: &str) -> Self {
        ConvertError::PlatformUnavailable {
            renderer: renderer.to_string(),
            hint: format!("Converting to {output} requires it. {hint}"),
        }
    }
}

//! Page-range extraction: copy pages `start..=end` of a PDF into a new PDF.
//!
//! ## Validation order
//!
//! 1. the input file exists and is readable
//! 2. both bounds parse as integers
//! 3. `start ≥ 1` and `end ≥ start`
//! 4. after opening the document, `end ≤ page count`
//!
//! Nothing is written until every check has passed. The new document is
//! staged next to the destination and renamed into place, so a failure at
//! any point leaves no output file.

use crate::convert::check_input_file;
use crate::error::ConvertError;
use crate::output::StagedFile;
use lopdf::Document;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A validated, 1-based, inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// Build a range from integers, rejecting `start < 1` and `end < start`.
    pub fn new(start: i64, end: i64) -> Result<Self, ConvertError> {
        let invalid = || ConvertError::InvalidPageRange { start, end };
        if start < 1 || end < start {
            return Err(invalid());
        }
        Ok(Self {
            start: u32::try_from(start).map_err(|_| invalid())?,
            end: u32::try_from(end).map_err(|_| invalid())?,
        })
    }

    /// Parse both bounds from user text (surrounding whitespace allowed).
    pub fn parse(start: &str, end: &str) -> Result<Self, ConvertError> {
        match (start.trim().parse::<i64>(), end.trim().parse::<i64>()) {
            (Ok(s), Ok(e)) => Self::new(s, e),
            _ => Err(ConvertError::NonIntegerPage {
                start: start.to_string(),
                end: end.to_string(),
            }),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Never true for a validated range.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 1-based page numbers in the range.
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Fail with [`ConvertError::PageOutOfRange`] if the range runs past `total`.
    pub fn check_within(&self, total: u32) -> Result<(), ConvertError> {
        if self.end > total {
            return Err(ConvertError::PageOutOfRange {
                start: self.start,
                end: self.end,
                total,
            });
        }
        Ok(())
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Extract pages `start..=end` (1-based, inclusive) of `input` into `output`.
///
/// `start` and `end` are taken as text, the way a form field delivers them.
/// Returns the written output path.
///
/// # Errors
/// * [`ConvertError::InvalidFile`]: `input` is missing or unreadable
/// * [`ConvertError::NonIntegerPage`]: a bound is not an integer
/// * [`ConvertError::InvalidPageRange`]: `start < 1` or `end < start`
/// * [`ConvertError::PageOutOfRange`]: `end` exceeds the page count
/// * [`ConvertError::CorruptPdf`] / [`ConvertError::PasswordRequired`]: the
///   source cannot be opened
pub fn slice(
    input: impl AsRef<Path>,
    start: &str,
    end: &str,
    output: impl AsRef<Path>,
) -> Result<PathBuf, ConvertError> {
    let input = input.as_ref();
    let range = check_request(input, start, end)?;
    extract(input, range, output.as_ref())
}

/// Validate a slice request without touching any output: the input file
/// first, then the page bounds.
pub fn check_request(
    input: impl AsRef<Path>,
    start: &str,
    end: &str,
) -> Result<PageRange, ConvertError> {
    check_input_file(input.as_ref())?;
    PageRange::parse(start, end)
}

/// [`slice`] for callers that already hold a validated [`PageRange`].
pub fn slice_range(
    input: impl AsRef<Path>,
    range: PageRange,
    output: impl AsRef<Path>,
) -> Result<PathBuf, ConvertError> {
    let input = input.as_ref();
    check_input_file(input)?;
    extract(input, range, output.as_ref())
}

fn extract(input: &Path, range: PageRange, output: &Path) -> Result<PathBuf, ConvertError> {
    info!(
        "Extracting pages {} from {} → {}",
        range,
        input.display(),
        output.display()
    );

    let mut doc = Document::load(input).map_err(|e| ConvertError::CorruptPdf {
        path: input.to_path_buf(),
        detail: e.to_string(),
    })?;
    if doc.is_encrypted() {
        return Err(ConvertError::PasswordRequired {
            path: input.to_path_buf(),
        });
    }

    let pages = doc.get_pages();
    let total = u32::try_from(pages.len()).unwrap_or(u32::MAX);
    range.check_within(total)?;

    let dropped: Vec<u32> = pages
        .keys()
        .copied()
        .filter(|n| !range.pages().contains(n))
        .collect();
    debug!("Keeping {} of {} pages", range.len(), total);
    doc.delete_pages(&dropped);
    doc.prune_objects();

    let mut staged = StagedFile::create(output)?;
    doc.save_to(staged.file())
        .map_err(|e| ConvertError::write_failed(output, std::io::Error::other(e.to_string())))?;
    let written = staged.commit()?;

    info!("Wrote {} pages to {}", range.len(), written.display());
    Ok(written)
}

//! Positioned text from PDF pages, grouped into reading-order lines.
//!
//! pdfium reports text as segments: runs sharing a baseline and font, each
//! with a bounding box in PDF user space (origin bottom-left, y up). Both
//! pdf→docx and table detection start from these boxes.

use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

/// One text run with its bounding box, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// 1-based page number.
    pub page: usize,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub text: String,
}

impl TextFragment {
    pub fn height(&self) -> f32 {
        (self.top - self.bottom).abs()
    }

    pub fn centre_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Fragments sharing a baseline, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub page: usize,
    pub fragments: Vec<TextFragment>,
}

impl TextLine {
    /// Typical glyph height on this line.
    pub fn height(&self) -> f32 {
        self.fragments
            .iter()
            .map(TextFragment::height)
            .fold(0.0, f32::max)
            .max(1.0)
    }

    pub fn centre_y(&self) -> f32 {
        let n = self.fragments.len().max(1) as f32;
        self.fragments.iter().map(TextFragment::centre_y).sum::<f32>() / n
    }

    /// Line text, with a space inserted where adjacent runs are visibly apart.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut prev_right: Option<f32> = None;
        let gap_for_space = self.height() * 0.15;
        for frag in &self.fragments {
            if let Some(right) = prev_right {
                let apart = frag.left - right > gap_for_space;
                let spaced = out.ends_with(char::is_whitespace)
                    || frag.text.starts_with(char::is_whitespace);
                if apart && !spaced {
                    out.push(' ');
                }
            }
            out.push_str(&frag.text);
            prev_right = Some(frag.right);
        }
        out.trim().to_string()
    }
}

/// Text fragments of every page, indexed by page.
pub fn extract_fragments(
    document: &PdfDocument,
    source: &Path,
) -> Result<Vec<Vec<TextFragment>>, ConvertError> {
    let mut pages_out = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let page_no = idx + 1;
        let text = page.text().map_err(|e| ConvertError::CorruptPdf {
            path: source.to_path_buf(),
            detail: format!("page {page_no}: {:?}", e),
        })?;

        let mut fragments = Vec::new();
        for segment in text.segments().iter() {
            let content = segment.text();
            if content.trim().is_empty() {
                continue;
            }
            let b = segment.bounds();
            fragments.push(TextFragment {
                page: page_no,
                left: b.left().value,
                right: b.right().value,
                top: b.top().value,
                bottom: b.bottom().value,
                text: content,
            });
        }
        debug!("Page {}: {} text segments", page_no, fragments.len());
        pages_out.push(fragments);
    }
    Ok(pages_out)
}

/// Group one page's fragments into lines, top of the page first.
///
/// A fragment joins the current line when its vertical centre lies within
/// half a line height of the line's centre.
pub fn group_lines(fragments: &[TextFragment]) -> Vec<TextLine> {
    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| {
        b.centre_y()
            .partial_cmp(&a.centre_y())
            .unwrap_or(Ordering::Equal)
    });

    let mut lines: Vec<TextLine> = Vec::new();
    for frag in sorted {
        let joins = lines.last().is_some_and(|line| {
            let tolerance = line.height().max(frag.height()) * 0.5;
            (line.centre_y() - frag.centre_y()).abs() <= tolerance
        });
        match lines.last_mut() {
            Some(line) if joins => line.fragments.push(frag.clone()),
            _ => lines.push(TextLine {
                page: frag.page,
                fragments: vec![frag.clone()],
            }),
        }
    }

    for line in &mut lines {
        line.fragments
            .sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal));
    }
    lines
}

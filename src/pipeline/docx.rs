//! pdf→docx: rebuild the document's text as WordprocessingML.
//!
//! Every text line becomes a paragraph, and pages are separated by explicit
//! page breaks. Fonts, images and layout beyond line order are not carried
//! over. The section size follows the first PDF page.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::format::Delegate;
use crate::output::StagedFile;
use crate::pipeline::render;
use crate::pipeline::text::{extract_fragments, group_lines};
use docx_rs::{BreakType, Docx, Paragraph, Run};
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Page size in points; US Letter when the PDF has no pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
        }
    }
}

/// Convert `input` to a Word document at `output`.
pub fn pdf_to_docx(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<PathBuf, ConvertError> {
    let pdfium = render::bind(config)?;
    let document = render::load(&pdfium, input, config.password.as_deref())?;

    let size = document
        .pages()
        .first()
        .map(|p| PageSize {
            width: p.width().value,
            height: p.height().value,
        })
        .unwrap_or_default();

    let pages: Vec<Vec<String>> = extract_fragments(&document, input)?
        .iter()
        .map(|frags| group_lines(frags).iter().map(|l| l.text()).collect())
        .collect();
    let line_count: usize = pages.iter().map(Vec::len).sum();
    info!(
        "Rebuilding {} pages ({} lines) of {} as docx",
        pages.len(),
        line_count,
        input.display()
    );

    let mut staged = StagedFile::create(output)?;
    write_docx(BufWriter::new(staged.file()), &pages, size)
        .and_then(|mut w| w.flush())
        .map_err(|e| ConvertError::delegate(Delegate::PdfToDocx, e))?;
    staged.commit()
}

/// Write a docx package with one paragraph per line and a page break between pages.
pub fn write_docx<W: Write + Seek>(mut out: W, pages: &[Vec<String>], size: PageSize) -> io::Result<W> {
    // twentieths of a point
    let twips = |pt: f32| (pt * 20.0).round().max(1.0) as u32;
    let mut doc = Docx::new().page_size(twips(size.width), twips(size.height));

    for (idx, lines) in pages.iter().enumerate() {
        if idx > 0 {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }
        for line in lines {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(xml_safe(line))));
        }
    }

    doc.build().pack(&mut out).map_err(io::Error::other)?;
    Ok(out)
}

/// Drop characters XML 1.0 cannot carry (C0 controls other than tab/LF/CR).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .filter(|&c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect()
}

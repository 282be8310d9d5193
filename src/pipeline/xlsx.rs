//! pdf→xlsx: detected tables become worksheets `Sheet1`, `Sheet2`, …
//!
//! Sheets follow detection order (page order, then top to bottom). The first
//! row of each table is the header and is always written as text; in other
//! rows, cells that parse as finite numbers are written as numbers.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::format::Delegate;
use crate::output::StagedFile;
use crate::pipeline::render;
use crate::pipeline::tables::{Table, TableDetector};
use crate::pipeline::text::{extract_fragments, group_lines};
use rust_xlsxwriter::Workbook;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Extract every table in `input` into a workbook at `output`.
///
/// Fails with [`ConvertError::NoTablesFound`], writing nothing, when the
/// document contains no tables.
pub fn pdf_to_xlsx(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<PathBuf, ConvertError> {
    let pdfium = render::bind(config)?;
    let document = render::load(&pdfium, input, config.password.as_deref())?;
    let detector = TableDetector::from_config(config);

    let tables: Vec<Table> = extract_fragments(&document, input)?
        .iter()
        .flat_map(|frags| detector.detect(&group_lines(frags)))
        .collect();
    if tables.is_empty() {
        return Err(ConvertError::NoTablesFound {
            path: input.to_path_buf(),
        });
    }
    info!(
        "Found {} tables in {}; writing {}",
        tables.len(),
        input.display(),
        output.display()
    );

    let mut staged = StagedFile::create(output)?;
    write_workbook(BufWriter::new(staged.file()), &tables)
        .and_then(|mut w| w.flush())
        .map_err(|e| ConvertError::delegate(Delegate::PdfToXlsx, e))?;
    staged.commit()
}

/// `Sheet{n}` for 0-based sheet index `idx`.
pub fn sheet_name(idx: usize) -> String {
    format!("Sheet{}", idx + 1)
}

/// Write one worksheet per table.
pub fn write_workbook<W: Write>(mut out: W, tables: &[Table]) -> io::Result<W> {
    let mut workbook = Workbook::new();

    for (idx, table) in tables.iter().enumerate() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(idx)).map_err(io::Error::other)?;

        for (r, row) in table.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (r, c) = (r as u32, c as u16);
                let written = match numeric(value).filter(|_| r > 0) {
                    Some(n) => sheet.write_number(r, c, n),
                    None => sheet.write_string(r, c, value),
                };
                written.map_err(io::Error::other)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer().map_err(io::Error::other)?;
    out.write_all(&bytes)?;
    Ok(out)
}

/// `value` as a number.
///
/// Commas are accepted only as thousands separators in well-formed groups
/// (`1,234.5`). Leading zeros (`007`) mark an identifier and stay text.
fn numeric(value: &str) -> Option<f64> {
    let v = value.trim();
    let unsigned = v.strip_prefix(['-', '+']).unwrap_or(v);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return None;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return None;
    }
    if !frac_part.is_none_or(|f| f.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    if int_part.contains(',') && !thousands_grouped(int_part) {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit() || b == b',') {
        return None;
    }

    let cleaned: String = v.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `1,234` or `12,345,678`: a 1–3 digit lead followed by 3-digit groups.
fn thousands_grouped(int_part: &str) -> bool {
    let mut groups = int_part.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

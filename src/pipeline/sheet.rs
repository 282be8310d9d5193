//! xlsx→csv: the first worksheet, row-major, as RFC 4180 CSV.
//!
//! No index column is added. Column order and the header row are kept
//! exactly as read. Integral floats print without a fractional part (`3`,
//! not `3.0`), which is how spreadsheet users expect whole numbers to look.

use crate::error::ConvertError;
use crate::format::Delegate;
use crate::output::StagedFile;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use chrono::Timelike;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Export the first worksheet of `input` to `output`.
pub fn xlsx_to_csv(input: &Path, output: &Path) -> Result<PathBuf, ConvertError> {
    let fail = |e: &dyn std::fmt::Display| ConvertError::delegate(Delegate::XlsxToCsv, e);

    let mut workbook = open_workbook_auto(input).map_err(|e| fail(&e))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| fail(&"workbook has no worksheets"))?;
    let range = workbook.worksheet_range(&first).map_err(|e| fail(&e))?;
    let (rows, cols) = range.get_size();
    info!(
        "Exporting sheet '{}' ({} rows × {} columns) of {}",
        first,
        rows,
        cols,
        input.display()
    );

    let mut staged = StagedFile::create(output)?;
    {
        let mut w = BufWriter::new(staged.file());
        write_csv(&mut w, &range).map_err(|e| ConvertError::write_failed(output, e))?;
        w.flush().map_err(|e| ConvertError::write_failed(output, e))?;
    }
    staged.commit()
}

/// Write `range` as CSV, one record per row, `\n` line endings.
pub fn write_csv<W: Write>(w: &mut W, range: &Range<Data>) -> std::io::Result<()> {
    let mut written = 0usize;
    for row in range.rows() {
        let record: Vec<String> = row.iter().map(|c| quote(&cell_text(c))).collect();
        writeln!(w, "{}", record.join(","))?;
        written += 1;
    }
    debug!("Wrote {} CSV records", written);
    Ok(())
}

/// Display form of one cell.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => date_text(dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// `2024-03-15`, or `2024-03-15 12:30:00` when the value carries a time.
/// Durations and serials outside the calendar print as the raw serial.
fn date_text(dt: &ExcelDateTime) -> String {
    let serial = || cell_text(&Data::Float(dt.as_f64()));
    if dt.is_duration() {
        return serial();
    }
    match dt.as_datetime() {
        Some(t) if t.num_seconds_from_midnight() == 0 => t.format("%Y-%m-%d").to_string(),
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial(),
    }
}

/// Quote a field when it contains a comma, quote, CR or LF.
pub fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

//! Table detection over positioned text.
//!
//! A page line is split into cells wherever two adjacent runs are separated
//! by more than [`TableDetector::cell_gap`] line heights. A table is then a
//! run of consecutive lines that
//!
//! * all have the same number of cells (at least `min_columns`),
//! * keep their columns aligned (cell `i` of one row horizontally overlaps
//!   cell `i` of the next), and
//! * spans at least `min_rows` lines.
//!
//! Ruled-grid detection and merged cells are not attempted.

use crate::config::ConverterConfig;
use crate::pipeline::text::TextLine;
use tracing::debug;

/// A detected table; `rows[0]` is the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// 1-based page the table was found on.
    pub page: usize,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    left: f32,
    right: f32,
    text: String,
}

/// Heuristic table finder.
#[derive(Debug, Clone)]
pub struct TableDetector {
    pub min_rows: usize,
    pub min_columns: usize,
    /// Horizontal gap, in line heights, that separates two cells.
    pub cell_gap: f32,
}

impl Default for TableDetector {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            cell_gap: 1.0,
        }
    }
}

impl TableDetector {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            min_rows: config.table_min_rows,
            min_columns: config.table_min_columns,
            ..Self::default()
        }
    }

    /// Tables on one page, top to bottom.
    pub fn detect(&self, lines: &[TextLine]) -> Vec<Table> {
        let rows: Vec<Vec<Cell>> = lines.iter().map(|l| self.cells(l)).collect();

        let mut tables = Vec::new();
        let mut start = 0;
        while start < rows.len() {
            let width = rows[start].len();
            let mut end = start + 1;
            if width >= self.min_columns {
                while end < rows.len()
                    && rows[end].len() == width
                    && aligned(&rows[end - 1], &rows[end])
                {
                    end += 1;
                }
            }

            if width >= self.min_columns && end - start >= self.min_rows {
                let page = lines[start].page;
                debug!(
                    "Table on page {}: {} rows × {} columns",
                    page,
                    end - start,
                    width
                );
                tables.push(Table {
                    page,
                    rows: rows[start..end]
                        .iter()
                        .map(|r| r.iter().map(|c| c.text.clone()).collect())
                        .collect(),
                });
            }
            start = end;
        }
        tables
    }

    fn cells(&self, line: &TextLine) -> Vec<Cell> {
        let threshold = line.height() * self.cell_gap;
        let mut cells: Vec<Cell> = Vec::new();
        for frag in &line.fragments {
            match cells.last_mut() {
                Some(cell) if frag.left - cell.right <= threshold => {
                    if !cell.text.ends_with(' ') && !frag.text.starts_with(' ') {
                        cell.text.push(' ');
                    }
                    cell.text.push_str(&frag.text);
                    cell.right = cell.right.max(frag.right);
                }
                _ => cells.push(Cell {
                    left: frag.left,
                    right: frag.right,
                    text: frag.text.clone(),
                }),
            }
        }
        for cell in &mut cells {
            cell.text = cell.text.trim().to_string();
        }
        cells
    }
}

/// Column `i` of `a` overlaps column `i` of `b` for every `i`.
fn aligned(a: &[Cell], b: &[Cell]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| x.left <= y.right && y.left <= x.right)
}

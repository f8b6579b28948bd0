//! Workbook ingestion: XLS/XLSX bytes to per-sheet cell arrays under hard caps.

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};

use crate::error::{Result, TabulaError};

/// Sheets processed per workbook; later sheets are ignored.
pub const MAX_SHEETS: usize = 8;

/// Rows processed per sheet; a taller sheet is clamped to exactly this many.
pub const MAX_SHEET_ROWS: usize = 2_500;

/// Columns processed per sheet; a wider sheet is clamped.
pub const MAX_SHEET_COLS: usize = 80;

/// Cumulative cell cap across processed sheets. Exceeding it fails the
/// whole request before any per-cell work starts.
pub const MAX_TOTAL_CELLS: usize = 1_200_000;

/// One sheet's raw cell array, clamped to the row/col caps.
///
/// Unlike a [`Grid`](super::Grid), blank rows are kept: the region locator
/// needs original row positions to find dense runs.
#[derive(Debug, Clone)]
pub struct SheetCells {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Trimmed cell strings, row-major.
    pub cells: Vec<Vec<String>>,
}

/// Load the processable sheets of a workbook from in-memory bytes.
///
/// Fails with [`TabulaError::Parse`] when the bytes are not a readable
/// spreadsheet container and with [`TabulaError::ResourceLimitExceeded`] when
/// the clamped sheets together exceed the cell cap, which is checked from
/// declared range dimensions before any cell is converted.
pub fn load_sheets(bytes: &[u8]) -> Result<Vec<SheetCells>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| TabulaError::Parse(format!("unreadable spreadsheet container: {e}")))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(TabulaError::Parse("workbook has no sheets".to_string()));
    }

    let mut ranges = Vec::new();
    let mut total_cells = 0usize;
    for name in names.iter().take(MAX_SHEETS) {
        let Ok(range) = workbook.worksheet_range(name) else {
            continue;
        };
        let rows = range.height().min(MAX_SHEET_ROWS);
        let cols = range.width().min(MAX_SHEET_COLS);
        total_cells += rows * cols;
        if total_cells > MAX_TOTAL_CELLS {
            return Err(TabulaError::ResourceLimitExceeded(format!(
                "workbook exceeds {MAX_TOTAL_CELLS} cells across processed sheets"
            )));
        }
        ranges.push((name.clone(), range));
    }

    let sheets = ranges
        .into_iter()
        .map(|(name, range)| {
            let cells = clamp_cells(
                range
                    .rows()
                    .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string())),
            );
            SheetCells { name, cells }
        })
        .collect();

    Ok(sheets)
}

/// Clamp a sheet's raw rows to the row/col caps: exactly the first 2,500 rows
/// and 80 columns are processed when more are declared, and nothing is
/// dropped when fewer exist.
fn clamp_cells<R, C>(rows: R) -> Vec<Vec<String>>
where
    R: Iterator<Item = C>,
    C: Iterator<Item = String>,
{
    rows.take(MAX_SHEET_ROWS)
        .map(|row| row.take(MAX_SHEET_COLS).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_a_parse_error() {
        let result = load_sheets(b"this is not a spreadsheet");
        assert!(matches!(result, Err(TabulaError::Parse(_))));
    }

    #[test]
    fn test_empty_bytes_are_a_parse_error() {
        let result = load_sheets(&[]);
        assert!(matches!(result, Err(TabulaError::Parse(_))));
    }

    #[test]
    fn test_tall_sheet_clamped_to_exactly_the_row_cap() {
        let rows = (0..3_000).map(|i| vec![i.to_string()].into_iter());
        let cells = clamp_cells(rows);
        assert_eq!(cells.len(), MAX_SHEET_ROWS);
        assert_eq!(cells[0][0], "0");
        assert_eq!(cells[MAX_SHEET_ROWS - 1][0], (MAX_SHEET_ROWS - 1).to_string());
    }

    #[test]
    fn test_short_sheet_is_never_dropped_below_the_cap() {
        let rows = (0..100).map(|i| vec![i.to_string()].into_iter());
        let cells = clamp_cells(rows);
        assert_eq!(cells.len(), 100);
    }

    #[test]
    fn test_wide_rows_clamped_to_the_column_cap() {
        let rows = std::iter::once((0..200).map(|i| i.to_string()));
        let cells = clamp_cells(rows);
        assert_eq!(cells[0].len(), MAX_SHEET_COLS);
    }
}

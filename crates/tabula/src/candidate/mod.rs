//! Table candidate assembly and scoring.

mod builder;
mod scorer;

pub use builder::build_candidate;
pub use scorer::score_candidate;

use serde::{Deserialize, Serialize};

use crate::input::{Region, SourceKind};

/// One hypothesis for "the table" extracted from a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCandidate {
    pub source_kind: SourceKind,
    /// Sheet name, for workbook sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Region bounds within the sheet, for workbook sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Index of the header row within the source grid.
    pub header_row: usize,
    /// Unique header names; order is column order.
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()`.
    pub rows: Vec<Vec<String>>,
    /// Confidence score in `[0, 1]`, deterministic for the same grid.
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

impl TableCandidate {
    /// Number of data rows (excluding the header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Key used to de-duplicate candidates across a workbook.
    pub fn dedup_key(&self) -> (Option<String>, usize, usize, usize) {
        (
            self.sheet.clone(),
            self.header_row,
            self.headers.len(),
            self.rows.len(),
        )
    }
}

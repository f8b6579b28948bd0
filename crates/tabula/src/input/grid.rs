//! Grid and source-kind primitives shared by all extraction stages.

use serde::{Deserialize, Serialize};

/// Where the raw bytes of a source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Text pasted directly by the user.
    Paste,
    /// Uploaded `.csv` file.
    Csv,
    /// Uploaded `.tsv` file.
    Tsv,
    /// Uploaded `.txt` file.
    Txt,
    /// Sheet extracted from an XLS/XLSX workbook.
    Excel,
}

impl SourceKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Paste => "pasted text",
            SourceKind::Csv => "csv",
            SourceKind::Tsv => "tsv",
            SourceKind::Txt => "txt",
            SourceKind::Excel => "excel",
        }
    }
}

/// Rectangular matrix of trimmed cell strings derived from one source.
///
/// Rows may have differing lengths until a candidate is built; fully blank
/// rows are dropped at construction so header detection never sees them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Build a grid from pre-trimmed rows, dropping fully blank ones.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|row| !row.iter().all(|cell| cell.is_empty()))
            .collect();
        Self { rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Borrow all rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Consume the grid, yielding its rows.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// A grid with fewer than 2 rows cannot yield a table candidate.
    pub fn is_usable(&self) -> bool {
        self.rows.len() >= 2
    }

    /// Check whether a cell counts as blank.
    pub fn is_blank(value: &str) -> bool {
        value.trim().is_empty()
    }
}

//! Candidate assembly: header selection, name dedup, row filtering.

use std::collections::HashMap;

use crate::input::{Grid, Region, SourceKind};
use crate::profile::parse_number;

use super::TableCandidate;
use super::scorer::score_candidate;

/// Rows scanned when picking the header row.
const HEADER_SCAN_ROWS: usize = 20;

/// Non-empty cells longer than this count against header likeness.
const LONG_HEADER_CELL_LEN: usize = 30;

/// Header-likeness weights.
const HEADER_NON_NUMERIC_WEIGHT: f64 = 0.6;
const HEADER_UNIQUE_WEIGHT: f64 = 0.35;
const HEADER_LONG_CELL_WEIGHT: f64 = 0.2;

/// Build a table candidate from a grid, or `None` when the grid cannot yield
/// a usable table.
pub fn build_candidate(
    grid: &Grid,
    source_kind: SourceKind,
    sheet: Option<String>,
    region: Option<Region>,
    notes: Vec<String>,
) -> Option<TableCandidate> {
    if !grid.is_usable() {
        return None;
    }

    let rows = grid.rows();
    let max_cols = grid.max_cols();

    let header_row = pick_header_row(rows);
    let header_score = header_likeness(&rows[header_row]);

    let mut headers: Vec<String> = (0..max_cols)
        .map(|i| {
            let cell = rows[header_row].get(i).map(String::as_str).unwrap_or("");
            if cell.is_empty() {
                format!("Column_{}", i + 1)
            } else {
                cell.to_string()
            }
        })
        .collect();
    headers = dedup_headers(headers);

    // Near-empty trailing rows are dropped; the threshold follows the column
    // count, bottoming out at 2.
    let required = match max_cols / 2 {
        0 => 2,
        half => half.min(2),
    };
    let data_rows: Vec<&Vec<String>> = rows[header_row + 1..]
        .iter()
        .filter(|row| row.iter().filter(|c| !c.trim().is_empty()).count() >= required)
        .collect();

    if data_rows.is_empty() {
        return None;
    }

    // Tabularity looks at raw row widths, so score before padding.
    let raw_lengths: Vec<usize> = data_rows.iter().map(|r| r.len()).collect();
    let score = score_candidate(header_score, &raw_lengths, &headers, &data_rows);

    let rows: Vec<Vec<String>> = data_rows
        .into_iter()
        .map(|row| {
            let mut padded = row.clone();
            while padded.len() < headers.len() {
                padded.push(String::new());
            }
            padded.truncate(headers.len());
            padded
        })
        .collect();

    Some(TableCandidate {
        source_kind,
        sheet,
        region,
        header_row,
        headers,
        rows,
        score,
        notes,
    })
}

/// Pick the most header-like row among the first `min(20, rows)` rows.
/// Ties go to the earliest row.
fn pick_header_row(rows: &[Vec<String>]) -> usize {
    let mut best_row = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (idx, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let score = header_likeness(row);
        if score > best_score {
            best_score = score;
            best_row = idx;
        }
    }
    best_row
}

/// Header-likeness of a row over its non-empty cells: mostly non-numeric,
/// mostly unique, few long cells.
fn header_likeness(row: &[String]) -> f64 {
    let cells: Vec<&str> = row
        .iter()
        .map(String::as_str)
        .filter(|c| !c.trim().is_empty())
        .collect();
    if cells.is_empty() {
        return 0.0;
    }

    let total = cells.len() as f64;
    let numeric = cells.iter().filter(|c| parse_number(c).is_some()).count() as f64;
    let unique = {
        let mut seen: Vec<&str> = Vec::new();
        for cell in &cells {
            if !seen.contains(cell) {
                seen.push(cell);
            }
        }
        seen.len() as f64
    };
    let long = cells
        .iter()
        .filter(|c| c.chars().count() > LONG_HEADER_CELL_LEN)
        .count() as f64;

    let score = HEADER_NON_NUMERIC_WEIGHT * (1.0 - numeric / total)
        + HEADER_UNIQUE_WEIGHT * (unique / total)
        - HEADER_LONG_CELL_WEIGHT * (long / total);
    score.clamp(0.0, 1.0)
}

/// Make header names unique by suffixing `_2`, `_3`, ... on case-insensitive
/// repeats.
fn dedup_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());

    for name in raw {
        let key = name.to_lowercase();
        let count = {
            let entry = seen.entry(key).or_insert(0);
            *entry += 1;
            *entry
        };
        if count == 1 {
            out.push(name);
            continue;
        }

        let mut suffix = count;
        loop {
            let candidate = format!("{name}_{suffix}");
            let candidate_key = candidate.to_lowercase();
            if !seen.contains_key(&candidate_key) {
                seen.insert(candidate_key, 1);
                out.push(candidate);
                break;
            }
            suffix += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<&str>>) -> Grid {
        Grid::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_dedup_headers() {
        let headers = dedup_headers(vec!["Name".into(), "name".into(), "Name".into()]);
        assert_eq!(headers, vec!["Name", "name_2", "Name_3"]);
    }

    #[test]
    fn test_dedup_headers_avoids_existing_suffix() {
        let headers = dedup_headers(vec!["a".into(), "a_2".into(), "a".into()]);
        assert_eq!(headers.len(), 3);
        let mut lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), 3);
    }

    #[test]
    fn test_header_row_is_first_text_row() {
        let g = grid(vec![
            vec!["Month", "Revenue"],
            vec!["Jan", "100"],
            vec!["Feb", "120"],
        ]);
        let candidate = build_candidate(&g, SourceKind::Csv, None, None, Vec::new()).unwrap();
        assert_eq!(candidate.header_row, 0);
        assert_eq!(candidate.headers, vec!["Month", "Revenue"]);
        assert_eq!(candidate.row_count(), 2);
    }

    #[test]
    fn test_blank_headers_get_positional_names() {
        let g = grid(vec![
            vec!["a", "", "c"],
            vec!["1", "2", "3"],
            vec!["4", "5", "6"],
        ]);
        let candidate = build_candidate(&g, SourceKind::Csv, None, None, Vec::new()).unwrap();
        assert_eq!(candidate.headers, vec!["a", "Column_2", "c"]);
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let g = grid(vec![
            vec!["a", "b", "c"],
            vec!["1", "2"],
            vec!["4", "5", "6"],
        ]);
        let candidate = build_candidate(&g, SourceKind::Csv, None, None, Vec::new()).unwrap();
        assert!(candidate.rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_near_empty_rows_dropped() {
        let g = grid(vec![
            vec!["a", "b", "c", "d"],
            vec!["1", "2", "3", "4"],
            vec!["x", "", "", ""],
            vec!["5", "6", "7", "8"],
        ]);
        let candidate = build_candidate(&g, SourceKind::Csv, None, None, Vec::new()).unwrap();
        assert_eq!(candidate.row_count(), 2);
    }

    #[test]
    fn test_unusable_grid_yields_none() {
        let g = grid(vec![vec!["only", "one", "row"]]);
        assert!(build_candidate(&g, SourceKind::Csv, None, None, Vec::new()).is_none());
    }
}

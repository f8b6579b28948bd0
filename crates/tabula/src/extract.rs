//! Extraction entry points: raw text or workbook bytes to ranked candidates.

use std::collections::HashSet;

use crate::candidate::{TableCandidate, build_candidate};
use crate::error::Result;
use crate::input::{SourceKind, load_sheets, locate_regions, slice_region, tokenize_text};

/// Candidates retained per extraction after ranking.
const MAX_CANDIDATES: usize = 25;

/// Extract table candidates from raw delimited text.
///
/// The source kind is provenance only; the delimiter is always detected from
/// the text. Unusable text yields an empty list, never an error.
pub fn extract_from_text(raw: &str, kind: SourceKind) -> Vec<TableCandidate> {
    let grid = tokenize_text(raw);
    let candidates = build_candidate(&grid, kind, None, None, Vec::new())
        .into_iter()
        .collect();
    rank_candidates(candidates)
}

/// Extract table candidates from XLS/XLSX workbook bytes.
///
/// Every processed sheet is scanned for dense regions; each region becomes a
/// candidate. Candidates are de-duplicated across the workbook and the top 25
/// by score are retained, in rank order.
pub fn extract_from_workbook(bytes: &[u8]) -> Result<Vec<TableCandidate>> {
    let sheets = load_sheets(bytes)?;

    let mut candidates = Vec::new();
    for sheet in &sheets {
        for located in locate_regions(&sheet.cells) {
            let grid = slice_region(&sheet.cells, located.region);
            if let Some(candidate) = build_candidate(
                &grid,
                SourceKind::Excel,
                Some(sheet.name.clone()),
                Some(located.region),
                located.notes,
            ) {
                candidates.push(candidate);
            }
        }
    }

    Ok(rank_candidates(candidates))
}

/// Pick the authoritative candidate: highest score, ties resolved by
/// discovery order.
pub fn select_best(candidates: &[TableCandidate]) -> Option<&TableCandidate> {
    let mut best: Option<&TableCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// De-duplicate in discovery order, then sort by descending score (stable, so
/// discovery order breaks ties) and keep the top 25.
fn rank_candidates(candidates: Vec<TableCandidate>) -> Vec<TableCandidate> {
    let mut seen = HashSet::new();
    let mut unique: Vec<TableCandidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key()))
        .collect();

    unique.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    unique.truncate(MAX_CANDIDATES);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_csv() {
        let candidates = extract_from_text("Month,Revenue\nJan,100\nFeb,120\nMar,90", SourceKind::Csv);
        assert_eq!(candidates.len(), 1);
        let table = &candidates[0];
        assert_eq!(table.header_row, 0);
        assert_eq!(table.headers, vec!["Month", "Revenue"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_extract_empty_text_yields_no_candidates() {
        assert!(extract_from_text("", SourceKind::Paste).is_empty());
        assert!(extract_from_text("just one line", SourceKind::Paste).is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let raw = "a,b,c\n1,2,x\n3,4,y\n5,6,z";
        let first = extract_from_text(raw, SourceKind::Csv);
        let second = extract_from_text(raw, SourceKind::Csv);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.score, b.score);
            assert_eq!(a.headers, b.headers);
            assert_eq!(a.rows, b.rows);
        }
    }

    #[test]
    fn test_select_best_prefers_earlier_on_tie() {
        let raw = "a,b\n1,2\n3,4";
        let mut candidates = extract_from_text(raw, SourceKind::Csv);
        let mut clone = candidates[0].clone();
        clone.sheet = Some("later".to_string());
        candidates.push(clone);
        let best = select_best(&candidates).unwrap();
        assert!(best.sheet.is_none());
    }
}

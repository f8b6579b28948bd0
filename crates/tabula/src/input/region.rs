//! Region location: dense rectangular sub-regions inside a sheet.

use serde::{Deserialize, Serialize};

use super::grid::Grid;

/// Non-blank cells a row needs to count as dense.
const DENSE_ROW_MIN_CELLS: usize = 3;

/// Consecutive dense rows needed to form a row-block.
const MIN_BLOCK_ROWS: usize = 3;

/// Rows that must back a column inside a block for it to be kept.
const MIN_COLUMN_HITS: usize = 2;

/// Consecutive kept columns needed to form a region.
const MIN_REGION_COLS: usize = 3;

/// Regions examined per sheet.
pub const MAX_REGIONS_PER_SHEET: usize = 12;

/// Rectangular sub-region of a sheet, inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub r0: usize,
    pub c0: usize,
    pub r1: usize,
    pub c1: usize,
}

/// A located region plus notes attached during discovery.
#[derive(Debug, Clone)]
pub struct LocatedRegion {
    pub region: Region,
    pub notes: Vec<String>,
}

/// Find up to 12 dense rectangular regions in a sheet's raw cell array.
///
/// When no dense region exists the whole sheet is returned as a single
/// low-confidence region rather than discarding the sheet. An empty sheet
/// yields no regions.
pub fn locate_regions(cells: &[Vec<String>]) -> Vec<LocatedRegion> {
    if cells.is_empty() {
        return Vec::new();
    }

    let dense: Vec<bool> = cells
        .iter()
        .map(|row| row.iter().filter(|c| !Grid::is_blank(c)).count() >= DENSE_ROW_MIN_CELLS)
        .collect();

    let mut regions = Vec::new();
    'blocks: for (start, end) in consecutive_runs(&dense, MIN_BLOCK_ROWS) {
        let width = cells[start..=end].iter().map(|r| r.len()).max().unwrap_or(0);

        // Count, per column, how many rows of the block have a value there.
        let mut hits = vec![0usize; width];
        for row in &cells[start..=end] {
            for (col, cell) in row.iter().enumerate() {
                if !Grid::is_blank(cell) {
                    hits[col] += 1;
                }
            }
        }

        let backed: Vec<bool> = hits.iter().map(|&h| h >= MIN_COLUMN_HITS).collect();
        for (c0, c1) in consecutive_runs(&backed, MIN_REGION_COLS) {
            regions.push(LocatedRegion {
                region: Region { r0: start, c0, r1: end, c1 },
                notes: Vec::new(),
            });
            if regions.len() >= MAX_REGIONS_PER_SHEET {
                break 'blocks;
            }
        }
    }

    if regions.is_empty() {
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0);
        if width == 0 {
            return Vec::new();
        }
        regions.push(LocatedRegion {
            region: Region { r0: 0, c0: 0, r1: cells.len() - 1, c1: width - 1 },
            notes: vec![
                "no dense table region detected; whole sheet used as a single region".to_string(),
            ],
        });
    }

    regions
}

/// Slice a region out of a sheet's cell array into a grid, padding short rows.
pub fn slice_region(cells: &[Vec<String>], region: Region) -> Grid {
    let rows = cells[region.r0..=region.r1.min(cells.len() - 1)]
        .iter()
        .map(|row| {
            (region.c0..=region.c1)
                .map(|col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Grid::new(rows)
}

/// Maximal runs of `true` with at least `min_len` entries, as inclusive bounds.
fn consecutive_runs(flags: &[bool], min_len: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (idx, &flag) in flags.iter().enumerate() {
        match (flag, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                if idx - s >= min_len {
                    runs.push((s, idx - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if flags.len() - s >= min_len {
            runs.push((s, flags.len() - 1));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(rows: Vec<Vec<&str>>) -> Vec<Vec<String>> {
        rows.into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_consecutive_runs() {
        let flags = [true, true, true, false, true, true];
        assert_eq!(consecutive_runs(&flags, 3), vec![(0, 2)]);
        assert_eq!(consecutive_runs(&flags, 2), vec![(0, 2), (4, 5)]);
    }

    #[test]
    fn test_locate_single_dense_region() {
        let sheet = cells(vec![
            vec!["", "", "", ""],
            vec!["a", "b", "c", ""],
            vec!["1", "2", "3", ""],
            vec!["4", "5", "6", ""],
            vec!["", "", "", ""],
        ]);
        let regions = locate_regions(&sheet);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region, Region { r0: 1, c0: 0, r1: 3, c1: 2 });
        assert!(regions[0].notes.is_empty());
    }

    #[test]
    fn test_sparse_sheet_falls_back_to_whole_sheet() {
        let sheet = cells(vec![
            vec!["a", "", ""],
            vec!["", "b", ""],
            vec!["", "", "c"],
        ]);
        let regions = locate_regions(&sheet);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region, Region { r0: 0, c0: 0, r1: 2, c1: 2 });
        assert!(!regions[0].notes.is_empty());
    }

    #[test]
    fn test_empty_sheet_yields_no_regions() {
        assert!(locate_regions(&[]).is_empty());
    }

    #[test]
    fn test_slice_region_pads_short_rows() {
        let sheet = cells(vec![
            vec!["a", "b", "c"],
            vec!["1", "2"],
            vec!["3", "4", "5"],
        ]);
        let grid = slice_region(&sheet, Region { r0: 0, c0: 0, r1: 2, c1: 2 });
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.rows()[1], vec!["1", "2", ""]);
    }
}

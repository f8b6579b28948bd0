//! Confidence synthesis: a deterministic threshold verdict over the chosen
//! candidate and its profile.

use serde::{Deserialize, Serialize};

use crate::candidate::TableCandidate;
use crate::profile::{ColumnKind, ProfileMeta};

/// Verdict thresholds. No learned weights, no hidden state.
const HIGH_MIN_SCORE: f64 = 0.70;
const HIGH_MIN_METRICS: usize = 2;
const HIGH_MAX_MISSING_PCT: f64 = 10.0;
const MEDIUM_MIN_SCORE: f64 = 0.45;
const MEDIUM_MIN_METRICS: usize = 1;
const MEDIUM_MAX_MISSING_PCT: f64 = 25.0;

/// Final verdict level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Machine-checkable reason behind the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    StructureStrong,
    StructureUsable,
    StructureWeak,
}

/// The raw numbers the verdict was derived from, rounded for display so a
/// caller can render them without recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMetrics {
    pub score: f64,
    pub metric_columns: usize,
    pub has_time: bool,
    pub has_group: bool,
    pub avg_missing_pct: f64,
}

/// Final verdict with its contributing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub level: ConfidenceLevel,
    pub reason_code: ReasonCode,
    pub metrics: ConfidenceMetrics,
}

/// Derive the verdict from the candidate score, metric coverage and average
/// missingness across numeric columns.
pub fn confidence(candidate: &TableCandidate, profile: &ProfileMeta) -> ConfidenceResult {
    let score = candidate.score;
    let metric_columns = profile.metric_columns.len();
    let has_time = profile.time_column.is_some();
    let has_group = !profile.group_columns.is_empty();
    let avg_missing_pct = average_missing(profile);

    let (level, reason_code) = if score >= HIGH_MIN_SCORE
        && metric_columns >= HIGH_MIN_METRICS
        && (has_time || has_group)
        && avg_missing_pct <= HIGH_MAX_MISSING_PCT
    {
        (ConfidenceLevel::High, ReasonCode::StructureStrong)
    } else if score >= MEDIUM_MIN_SCORE
        && metric_columns >= MEDIUM_MIN_METRICS
        && avg_missing_pct <= MEDIUM_MAX_MISSING_PCT
    {
        (ConfidenceLevel::Medium, ReasonCode::StructureUsable)
    } else {
        (ConfidenceLevel::Low, ReasonCode::StructureWeak)
    };

    ConfidenceResult {
        level,
        reason_code,
        metrics: ConfidenceMetrics {
            score: round_to(score, 2),
            metric_columns,
            has_time,
            has_group,
            avg_missing_pct: round_to(avg_missing_pct, 1),
        },
    }
}

/// Mean `missing_pct` over numeric columns; 0 when there are none.
fn average_missing(profile: &ProfileMeta) -> f64 {
    let missing: Vec<f64> = profile
        .columns
        .iter()
        .filter(|c| c.inferred_type == ColumnKind::Numeric)
        .map(|c| c.missing_pct)
        .collect();
    if missing.is_empty() {
        return 0.0;
    }
    missing.iter().sum::<f64>() / missing.len() as f64
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceKind;
    use crate::profile::profile;

    fn fixture(score: f64, rows: Vec<Vec<&str>>, headers: Vec<&str>) -> ConfidenceResult {
        let candidate = TableCandidate {
            source_kind: SourceKind::Csv,
            sheet: None,
            region: None,
            header_row: 0,
            headers: headers.into_iter().map(String::from).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
            score,
            notes: Vec::new(),
        };
        let meta = profile(&candidate);
        confidence(&candidate, &meta)
    }

    #[test]
    fn test_strong_structure_is_high() {
        let rows: Vec<Vec<&str>> = vec![
            vec!["2023-01-01", "10", "100", "5"],
            vec!["2023-02-01", "12", "110", "6"],
            vec!["2023-03-01", "11", "105", "7"],
        ];
        let result = fixture(0.75, rows, vec!["date", "units", "revenue", "cost"]);
        assert_eq!(result.level, ConfidenceLevel::High);
        assert_eq!(result.reason_code, ReasonCode::StructureStrong);
        assert_eq!(result.metrics.score, 0.75);
        assert!(result.metrics.has_time);
    }

    #[test]
    fn test_usable_structure_is_medium() {
        let rows: Vec<Vec<&str>> = vec![
            vec!["a", "10"],
            vec!["b", "12"],
            vec!["c", "11"],
        ];
        let result = fixture(0.5, rows, vec!["name", "value"]);
        assert_eq!(result.level, ConfidenceLevel::Medium);
        assert_eq!(result.reason_code, ReasonCode::StructureUsable);
    }

    #[test]
    fn test_weak_structure_is_low() {
        let rows: Vec<Vec<&str>> = vec![vec!["a", "x"], vec!["b", "y"]];
        let result = fixture(0.2, rows, vec!["name", "note"]);
        assert_eq!(result.level, ConfidenceLevel::Low);
        assert_eq!(result.reason_code, ReasonCode::StructureWeak);
    }

    #[test]
    fn test_high_missingness_blocks_high() {
        let rows: Vec<Vec<&str>> = (0..10)
            .map(|i| {
                if i < 6 {
                    vec!["2023-01-01", "10", "5"]
                } else {
                    vec!["2023-01-02", "", ""]
                }
            })
            .collect();
        let result = fixture(0.9, rows, vec!["date", "units", "cost"]);
        assert_ne!(result.level, ConfidenceLevel::High);
    }
}

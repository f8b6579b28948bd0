//! Candidate scoring: header plausibility, tabularity and richness.

use crate::profile::parse_number;

/// Candidate score weights. Empirically chosen; treat re-tuning as a
/// deliberate, tested change.
const SCORE_HEADER_WEIGHT: f64 = 0.35;
const SCORE_TABULARITY_WEIGHT: f64 = 0.25;
const SCORE_RICHNESS_WEIGHT: f64 = 0.35;
const SCORE_ROW_BONUS: f64 = 0.05;

/// Rows required for the row-count bonus.
const ROW_BONUS_MIN_ROWS: usize = 12;

/// Rows examined for richness.
const RICHNESS_SAMPLE_ROWS: usize = 200;

/// Numeric-parseable share for a column to count as numeric-dominant.
const NUMERIC_DOMINANT_RATIO: f64 = 0.75;

/// Unique-ratio ceiling and minimum samples for a categorical column.
const CATEGORICAL_UNIQUE_RATIO: f64 = 0.3;
const CATEGORICAL_MIN_SAMPLES: usize = 12;

/// Richness mix: numeric columns dominate, one categorical column completes.
const RICHNESS_NUMERIC_WEIGHT: f64 = 0.7;
const RICHNESS_NUMERIC_TARGET: usize = 2;
const RICHNESS_CATEGORICAL_WEIGHT: f64 = 0.3;

/// Combine the component scores into the candidate's confidence score.
pub fn score_candidate(
    header_score: f64,
    raw_row_lengths: &[usize],
    headers: &[String],
    rows: &[&Vec<String>],
) -> f64 {
    let tabularity = tabularity(raw_row_lengths);
    let richness = richness(headers.len(), rows);
    let row_bonus = if rows.len() >= ROW_BONUS_MIN_ROWS { 1.0 } else { 0.0 };

    let score = SCORE_HEADER_WEIGHT * header_score
        + SCORE_TABULARITY_WEIGHT * tabularity
        + SCORE_RICHNESS_WEIGHT * richness
        + SCORE_ROW_BONUS * row_bonus;
    score.clamp(0.0, 1.0)
}

/// How regular the raw row lengths are: `1 - stdev/mean`, clamped, and 0 for
/// fewer than 3 rows.
fn tabularity(lengths: &[usize]) -> f64 {
    if lengths.len() < 3 {
        return 0.0;
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<usize>() as f64 / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = lengths
        .iter()
        .map(|&l| (l as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

/// How much the candidate looks like data worth profiling: at least two
/// numeric-dominant columns and at least one categorical column, judged over
/// the first 200 rows.
fn richness(col_count: usize, rows: &[&Vec<String>]) -> f64 {
    let sample = &rows[..rows.len().min(RICHNESS_SAMPLE_ROWS)];

    let mut numeric_cols = 0usize;
    let mut categorical_cols = 0usize;

    for col in 0..col_count {
        let values: Vec<&str> = sample
            .iter()
            .filter_map(|row| row.get(col).map(String::as_str))
            .filter(|c| !c.trim().is_empty())
            .collect();
        if values.is_empty() {
            continue;
        }

        let numeric = values.iter().filter(|v| parse_number(v).is_some()).count();
        if numeric as f64 / values.len() as f64 >= NUMERIC_DOMINANT_RATIO {
            numeric_cols += 1;
            continue;
        }

        if values.len() >= CATEGORICAL_MIN_SAMPLES {
            let mut uniques: Vec<&str> = Vec::new();
            for value in &values {
                if !uniques.contains(value) {
                    uniques.push(value);
                }
            }
            if uniques.len() as f64 / values.len() as f64 <= CATEGORICAL_UNIQUE_RATIO {
                categorical_cols += 1;
            }
        }
    }

    let numeric_part = numeric_cols.min(RICHNESS_NUMERIC_TARGET) as f64
        / RICHNESS_NUMERIC_TARGET as f64;
    let categorical_part = if categorical_cols >= 1 { 1.0 } else { 0.0 };

    RICHNESS_NUMERIC_WEIGHT * numeric_part + RICHNESS_CATEGORICAL_WEIGHT * categorical_part
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabularity_regular_rows() {
        assert_eq!(tabularity(&[3, 3, 3, 3]), 1.0);
    }

    #[test]
    fn test_tabularity_needs_three_rows() {
        assert_eq!(tabularity(&[3, 3]), 0.0);
    }

    #[test]
    fn test_tabularity_penalizes_ragged_rows() {
        let regular = tabularity(&[4, 4, 4, 4]);
        let ragged = tabularity(&[1, 4, 8, 3]);
        assert!(ragged < regular);
    }

    #[test]
    fn test_richness_rewards_numeric_and_categorical() {
        let rows: Vec<Vec<String>> = (0..20)
            .map(|i| {
                vec![
                    if i % 2 == 0 { "a" } else { "b" }.to_string(),
                    i.to_string(),
                    (i * 2).to_string(),
                ]
            })
            .collect();
        let refs: Vec<&Vec<String>> = rows.iter().collect();
        assert_eq!(richness(3, &refs), 1.0);
    }

    #[test]
    fn test_richness_zero_for_free_text() {
        let rows: Vec<Vec<String>> = (0..20)
            .map(|i| vec![format!("sentence number {i}"), format!("more text {i}")])
            .collect();
        let refs: Vec<&Vec<String>> = rows.iter().collect();
        assert_eq!(richness(2, &refs), 0.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let rows: Vec<Vec<String>> = (0..15)
            .map(|i| vec![i.to_string(), (i * 2).to_string()])
            .collect();
        let refs: Vec<&Vec<String>> = rows.iter().collect();
        let lengths = vec![2; 15];
        let headers = vec!["a".to_string(), "b".to_string()];
        let score = score_candidate(1.0, &lengths, &headers, &refs);
        assert!((0.0..=1.0).contains(&score));
    }
}

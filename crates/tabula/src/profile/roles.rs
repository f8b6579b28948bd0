//! Table-level profile assembly and column role detection.

use serde::{Deserialize, Serialize};

use crate::candidate::TableCandidate;

use super::column::{ColumnKind, ColumnProfile, profile_column};

/// Caps on detected roles.
const MAX_GROUP_COLUMNS: usize = 3;
const MAX_METRIC_COLUMNS: usize = 12;
const MAX_CURRENCY_COLUMNS: usize = 6;
const MAX_PERCENT_COLUMNS: usize = 6;

/// Name fragments that mark a label column as time-like.
const TIME_NAME_HINTS: &[&str] = &["month", "date", "period"];

/// Whole-table profile: per-column inference plus detected roles.
///
/// Role detection is a pure function of `columns`; running it twice on the
/// same candidate gives the same result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMeta {
    pub row_count: usize,
    pub col_count: usize,
    pub columns: Vec<ColumnProfile>,
    /// Column holding the time axis, when one was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_column: Option<String>,
    /// Up to 3 grouping columns, ascending by cardinality.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub group_columns: Vec<String>,
    /// Up to 12 metric columns.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub metric_columns: Vec<String>,
    /// Up to 6 currency-flavored columns.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub currency_columns: Vec<String>,
    /// Up to 6 percent-flavored columns.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub percent_columns: Vec<String>,
}

impl ProfileMeta {
    /// Look up a column profile by header name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Profile every column of a candidate and detect dataset-level roles.
pub fn profile(candidate: &TableCandidate) -> ProfileMeta {
    let columns: Vec<ColumnProfile> = candidate
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(name, idx, &candidate.rows))
        .collect();

    let time_column = detect_time_column(&columns);
    let group_columns = detect_group_columns(&columns, time_column.as_deref());
    let metric_columns = detect_metric_columns(&columns);

    let currency_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.is_currency)
        .take(MAX_CURRENCY_COLUMNS)
        .map(|c| c.name.clone())
        .collect();
    let percent_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.is_percent)
        .take(MAX_PERCENT_COLUMNS)
        .map(|c| c.name.clone())
        .collect();

    ProfileMeta {
        row_count: candidate.row_count(),
        col_count: candidate.column_count(),
        columns,
        time_column,
        group_columns,
        metric_columns,
        currency_columns,
        percent_columns,
    }
}

/// The date-typed column with the best `(has stats, uniqueness)` score, else
/// the first label column whose normalized name is time-like.
fn detect_time_column(columns: &[ColumnProfile]) -> Option<String> {
    let mut best: Option<(&ColumnProfile, (bool, usize))> = None;
    for column in columns.iter().filter(|c| c.inferred_type == ColumnKind::Date) {
        let key = (column.date.is_some(), column.unique_count);
        match best {
            Some((_, best_key)) if key <= best_key => {}
            _ => best = Some((column, key)),
        }
    }
    if let Some((column, _)) = best {
        return Some(column.name.clone());
    }

    columns
        .iter()
        .filter(|c| c.inferred_type.is_label_like())
        .find(|c| {
            TIME_NAME_HINTS
                .iter()
                .any(|hint| c.normalized_name.contains(hint))
        })
        .map(|c| c.name.clone())
}

/// Up to 3 non-time label columns, ascending by cardinality.
fn detect_group_columns(columns: &[ColumnProfile], time_column: Option<&str>) -> Vec<String> {
    let mut groups: Vec<&ColumnProfile> = columns
        .iter()
        .filter(|c| c.inferred_type.is_label_like())
        .filter(|c| Some(c.name.as_str()) != time_column)
        .collect();
    groups.sort_by_key(|c| c.unique_count);
    groups
        .into_iter()
        .take(MAX_GROUP_COLUMNS)
        .map(|c| c.name.clone())
        .collect()
}

/// Up to 12 numeric/mixed columns, excluding identifier-named ones.
fn detect_metric_columns(columns: &[ColumnProfile]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.inferred_type.is_metric_like())
        .filter(|c| !c.normalized_name.ends_with("id"))
        .take(MAX_METRIC_COLUMNS)
        .map(|c| c.name.clone())
        .collect()
}

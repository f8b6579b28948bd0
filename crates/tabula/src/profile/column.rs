//! Per-column type inference and summary statistics.

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::date::{Granularity, ParsedDate, parse_date};
use super::value::parse_number;

/// Non-empty values sampled per column for type inference.
pub const TYPE_SAMPLE_SIZE: usize = 200;

/// Example values retained per column.
const MAX_EXAMPLES: usize = 4;

/// Numeric-parseable share needed for the `numeric` type.
const NUMERIC_RATIO_MIN: f64 = 0.85;

/// Date share a numeric column must stay under.
const NUMERIC_DATE_CEILING: f64 = 0.2;

/// Date-parseable share needed for the `date` type.
const DATE_RATIO_MIN: f64 = 0.75;

/// Numeric share a date column must stay under.
const DATE_NUMERIC_CEILING: f64 = 0.2;

/// Share of either kind past which an impure column is `mixed`.
const MIXED_RATIO_MIN: f64 = 0.4;

/// Unique-ratio ceiling for the `categorical` type.
const CATEGORICAL_UNIQUE_MAX: f64 = 0.2;

/// Non-empty values needed before a column can be `categorical`.
const CATEGORICAL_MIN_VALUES: usize = 12;

/// Share of numeric values carrying a currency symbol that marks a column.
const CURRENCY_VALUE_RATIO: f64 = 0.25;

/// Share of sampled values carrying a percent sign that marks a column.
const PERCENT_VALUE_RATIO: f64 = 0.10;

/// Inferred semantic type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Date,
    Categorical,
    Text,
    Mixed,
    Empty,
}

impl ColumnKind {
    /// Columns that can serve as metrics.
    pub fn is_metric_like(&self) -> bool {
        matches!(self, ColumnKind::Numeric | ColumnKind::Mixed)
    }

    /// Columns that can serve as labels.
    pub fn is_label_like(&self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Categorical)
    }
}

/// Numeric summary over the sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Date summary over the sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateStats {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub granularity: Granularity,
}

/// Per-column inference result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Header name as it appears in the candidate.
    pub name: String,
    /// Lowercased name with non-alphanumerics collapsed to underscores.
    pub normalized_name: String,
    pub inferred_type: ColumnKind,
    /// Missing share in percent, computed over the full row count.
    pub missing_pct: f64,
    /// Distinct values among the sampled non-empty values.
    pub unique_count: usize,
    /// Up to 4 distinct example values in first-seen order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateStats>,
    /// Over a quarter of the numeric values carried a currency symbol.
    pub is_currency: bool,
    /// Over a tenth of the sampled values carried a percent sign.
    pub is_percent: bool,
}

impl ColumnProfile {
    /// Date precision of the column, `Unknown` when no date stats exist.
    pub fn granularity(&self) -> Granularity {
        self.date.map(|d| d.granularity).unwrap_or(Granularity::Unknown)
    }
}

/// Collapse a header name for role matching.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_underscore = true;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Profile one column over the candidate's rows.
///
/// Type inference looks at the first 200 non-empty values only; the missing
/// share is computed over the full row count. Unparseable values never error,
/// they just do not count toward the numeric/date ratios.
pub fn profile_column(name: &str, index: usize, rows: &[Vec<String>]) -> ColumnProfile {
    let total = rows.len();
    let mut non_empty_total = 0usize;
    let mut sample: Vec<&str> = Vec::new();

    for row in rows {
        let cell = row.get(index).map(String::as_str).unwrap_or("");
        if cell.trim().is_empty() {
            continue;
        }
        non_empty_total += 1;
        if sample.len() < TYPE_SAMPLE_SIZE {
            sample.push(cell);
        }
    }

    let missing_pct = if total == 0 {
        0.0
    } else {
        (total - non_empty_total) as f64 / total as f64 * 100.0
    };

    if sample.is_empty() {
        return ColumnProfile {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            inferred_type: ColumnKind::Empty,
            missing_pct,
            unique_count: 0,
            examples: Vec::new(),
            numeric: None,
            date: None,
            is_currency: false,
            is_percent: false,
        };
    }

    let mut uniques: IndexSet<&str> = IndexSet::new();
    let mut num_ok = 0usize;
    let mut currency_hits = 0usize;
    let mut percent_hits = 0usize;
    let mut date_ok = 0usize;
    let mut numbers: Vec<f64> = Vec::new();
    let mut dates: Vec<(NaiveDate, Granularity)> = Vec::new();

    for &value in &sample {
        uniques.insert(value);
        if value.contains('%') {
            percent_hits += 1;
        }
        if let Some(parsed) = parse_number(value) {
            num_ok += 1;
            numbers.push(parsed.value);
            if parsed.is_currency {
                currency_hits += 1;
            }
        }
        if let Some(ParsedDate::Date { date, granularity }) = parse_date(value) {
            date_ok += 1;
            dates.push((date, granularity));
        }
    }

    let sampled = sample.len() as f64;
    let num_ratio = num_ok as f64 / sampled;
    let date_ratio = date_ok as f64 / sampled;
    let unique_ratio = uniques.len() as f64 / sampled;

    let inferred_type = if num_ratio >= NUMERIC_RATIO_MIN && date_ratio < NUMERIC_DATE_CEILING {
        ColumnKind::Numeric
    } else if date_ratio >= DATE_RATIO_MIN && num_ratio < DATE_NUMERIC_CEILING {
        ColumnKind::Date
    } else if num_ratio >= MIXED_RATIO_MIN || date_ratio >= MIXED_RATIO_MIN {
        ColumnKind::Mixed
    } else if unique_ratio <= CATEGORICAL_UNIQUE_MAX && sample.len() >= CATEGORICAL_MIN_VALUES {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    };

    let numeric = if numbers.is_empty() {
        None
    } else {
        let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        Some(NumericStats { min, max, mean })
    };

    let date = if dates.is_empty() {
        None
    } else {
        let min = dates.iter().map(|(d, _)| *d).min().unwrap();
        let max = dates.iter().map(|(d, _)| *d).max().unwrap();
        Some(DateStats { min, max, granularity: dominant_granularity(&dates) })
    };

    let examples: Vec<String> = uniques
        .iter()
        .take(MAX_EXAMPLES)
        .map(|v| v.to_string())
        .collect();

    ColumnProfile {
        name: name.to_string(),
        normalized_name: normalize_name(name),
        inferred_type,
        missing_pct,
        unique_count: uniques.len(),
        examples,
        numeric,
        date,
        is_currency: num_ok > 0 && currency_hits as f64 / num_ok as f64 > CURRENCY_VALUE_RATIO,
        is_percent: percent_hits as f64 / sampled > PERCENT_VALUE_RATIO,
    }
}

/// Most frequent granularity among the parsed dates, finer precision winning
/// ties.
fn dominant_granularity(dates: &[(NaiveDate, Granularity)]) -> Granularity {
    let order = [Granularity::Day, Granularity::Month, Granularity::Year];
    let mut best = Granularity::Unknown;
    let mut best_count = 0usize;
    for granularity in order {
        let count = dates.iter().filter(|(_, g)| *g == granularity).count();
        if count > best_count {
            best = granularity;
            best_count = count;
        }
    }
    best
}

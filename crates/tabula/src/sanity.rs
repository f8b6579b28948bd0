//! Internal-consistency scan over raw text and candidate rows.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profile::{ColumnKind, ProfileMeta, parse_number};

/// Categories reported at most, the compound flag included.
const MAX_CATEGORIES: usize = 10;

/// Literal examples retained per category.
const MAX_EXAMPLES: usize = 5;

/// Candidate rows rendered for the line-level scans.
const MAX_RENDERED_ROWS: usize = 200;

/// Rows scanned for duplicate keys.
const MAX_DUP_SCAN_ROWS: usize = 2_000;

/// Duplicate pairs counted into the category.
const MAX_DUP_REPORTED: usize = 10;

/// Tolerance when checking stated arithmetic.
const ARITHMETIC_TOLERANCE: f64 = 1e-9;

/// Values needed before percent scales are compared.
const PERCENT_SCALE_MIN_VALUES: usize = 20;

/// Negative share past which negatives in a mostly-positive column are
/// flagged, and the non-negatives needed first.
const NEGATIVE_SHARE: f64 = 0.02;
const NEGATIVE_MIN_NON_NEGATIVE: usize = 10;

/// Missing/non-numeric share flagged per metric-like column.
const MISSING_SHARE: f64 = 0.25;

/// Other categories needed before the compound flag fires.
const MULTIPLE_ISSUES_MIN: usize = 3;

static EQUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*([+\-*/])\s*(-?\d+(?:\.\d+)?)\s*=\s*(-?\d+(?:\.\d+)?)")
        .unwrap()
});

/// One class of detected data issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningCategory {
    pub key: String,
    pub label: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
}

impl WarningCategory {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            count: 0,
            examples: Vec::new(),
        }
    }

    fn record(&mut self, example: Option<String>) {
        self.count += 1;
        if let Some(example) = example {
            if self.examples.len() < MAX_EXAMPLES {
                self.examples.push(example);
            }
        }
    }

    fn fired(&self) -> bool {
        self.count > 0
    }
}

/// Result of the sanity scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningReport {
    pub categories: Vec<WarningCategory>,
    /// Sum of category counts.
    pub total: usize,
    pub headline: String,
}

/// Scan raw text lines plus a capped rendering of the candidate's rows for
/// internally-inconsistent patterns.
pub fn check_warnings(
    raw_text: &str,
    headers: &[String],
    rows: &[Vec<String>],
    profile: &ProfileMeta,
) -> WarningReport {
    let mut categories = Vec::new();

    if let Some(category) = check_equations(raw_text, rows) {
        categories.push(category);
    }
    if let Some(category) = check_percent_scales(headers, rows, profile) {
        categories.push(category);
    }
    if let Some(category) = check_negatives(headers, rows, profile) {
        categories.push(category);
    }
    if let Some(category) = check_duplicate_keys(headers, rows, profile) {
        categories.push(category);
    }
    if let Some(category) = check_missingness(headers, rows, profile) {
        categories.push(category);
    }
    if let Some(category) = check_parse_issues(headers, rows) {
        categories.push(category);
    }

    categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));

    if categories.len() >= MULTIPLE_ISSUES_MIN {
        let mut compound = WarningCategory::new("multiple_issues", "Multiple issue types detected");
        compound.count = 1;
        categories.insert(0, compound);
    }
    categories.truncate(MAX_CATEGORIES);

    let total: usize = categories.iter().map(|c| c.count).sum();
    let headline = if categories.is_empty() {
        "No internal consistency issues detected".to_string()
    } else {
        format!("{}: {} finding(s) across {} categories", categories[0].label, total, categories.len())
    };

    WarningReport { categories, total, headline }
}

/// Lines stating `number op number = number` where the arithmetic is off.
fn check_equations(raw_text: &str, rows: &[Vec<String>]) -> Option<WarningCategory> {
    let mut category = WarningCategory::new("equations_inconsistent", "Inconsistent arithmetic");

    let rendered: Vec<String> = rows
        .iter()
        .take(MAX_RENDERED_ROWS)
        .map(|row| row.join("\t"))
        .collect();
    let lines = raw_text.lines().map(str::to_string).chain(rendered);

    for line in lines {
        for caps in EQUATION.captures_iter(&line) {
            let (Ok(lhs), Ok(rhs), Ok(stated)) = (
                caps[1].parse::<f64>(),
                caps[3].parse::<f64>(),
                caps[4].parse::<f64>(),
            ) else {
                continue;
            };
            let computed = match &caps[2] {
                "+" => lhs + rhs,
                "-" => lhs - rhs,
                "*" => lhs * rhs,
                "/" => {
                    if rhs == 0.0 {
                        continue;
                    }
                    lhs / rhs
                }
                _ => continue,
            };
            if (computed - stated).abs() > ARITHMETIC_TOLERANCE {
                category.record(Some(format!(
                    "{} (expected {}, found {})",
                    caps[0].trim(),
                    computed,
                    stated
                )));
            }
        }
    }

    category.fired().then_some(category)
}

/// Percent columns mixing proportion-scale (0-1) and percent-scale (1-100)
/// values.
fn check_percent_scales(
    headers: &[String],
    rows: &[Vec<String>],
    profile: &ProfileMeta,
) -> Option<WarningCategory> {
    let mut category = WarningCategory::new("mixed_percent_scale", "Mixed percent scales");

    for name in &profile.percent_columns {
        let Some(idx) = headers.iter().position(|h| h == name) else {
            continue;
        };

        let mut checked = 0usize;
        let mut proportions: Vec<&str> = Vec::new();
        let mut percents: Vec<&str> = Vec::new();
        for row in rows {
            let Some(cell) = row.get(idx) else { continue };
            let Some(parsed) = parse_number(cell) else { continue };
            checked += 1;
            let v = parsed.value;
            if v > 0.0 && v <= 1.0 {
                proportions.push(cell);
            } else if v > 1.0 && v <= 100.0 {
                percents.push(cell);
            }
        }

        if checked >= PERCENT_SCALE_MIN_VALUES && !proportions.is_empty() && !percents.is_empty() {
            let minority = proportions.len().min(percents.len());
            for _ in 0..minority {
                category.record(None);
            }
            if category.examples.len() < MAX_EXAMPLES {
                category.examples.push(format!(
                    "{}: {} vs {}",
                    name,
                    proportions[0].trim(),
                    percents[0].trim()
                ));
            }
        }
    }

    category.fired().then_some(category)
}

/// Numeric columns that are mostly non-negative but carry a real share of
/// negatives.
fn check_negatives(
    headers: &[String],
    rows: &[Vec<String>],
    profile: &ProfileMeta,
) -> Option<WarningCategory> {
    let mut category = WarningCategory::new("unexpected_negatives", "Unexpected negative values");

    for column in profile.columns.iter().filter(|c| c.inferred_type == ColumnKind::Numeric) {
        let Some(idx) = headers.iter().position(|h| h == &column.name) else {
            continue;
        };

        let mut non_negative = 0usize;
        let mut negatives: Vec<&str> = Vec::new();
        let mut checked = 0usize;
        for row in rows {
            let Some(cell) = row.get(idx) else { continue };
            let Some(parsed) = parse_number(cell) else { continue };
            checked += 1;
            if parsed.value < 0.0 {
                negatives.push(cell);
            } else {
                non_negative += 1;
            }
        }

        if non_negative >= NEGATIVE_MIN_NON_NEGATIVE
            && !negatives.is_empty()
            && negatives.len() as f64 / checked as f64 > NEGATIVE_SHARE
        {
            for cell in &negatives {
                category.record(Some(format!("{}: {}", column.name, cell.trim())));
            }
        }
    }

    category.fired().then_some(category)
}

/// Repeated `(time, group)` key pairs.
fn check_duplicate_keys(
    headers: &[String],
    rows: &[Vec<String>],
    profile: &ProfileMeta,
) -> Option<WarningCategory> {
    let time_idx = profile
        .time_column
        .as_deref()
        .and_then(|name| headers.iter().position(|h| h == name))?;
    let group_idx = profile
        .group_columns
        .first()
        .and_then(|name| headers.iter().position(|h| h == name))?;

    let mut counts: IndexMap<(String, String), usize> = IndexMap::new();
    for row in rows.iter().take(MAX_DUP_SCAN_ROWS) {
        let time = row.get(time_idx).map(String::as_str).unwrap_or("").trim();
        let group = row.get(group_idx).map(String::as_str).unwrap_or("").trim();
        if time.is_empty() && group.is_empty() {
            continue;
        }
        *counts.entry((time.to_string(), group.to_string())).or_insert(0) += 1;
    }

    let mut category = WarningCategory::new("duplicate_keys", "Duplicate time/group rows");
    for ((time, group), n) in counts.iter() {
        if *n < 2 {
            continue;
        }
        if category.count >= MAX_DUP_REPORTED {
            break;
        }
        category.record(Some(format!("{time} / {group} x{n}")));
    }

    category.fired().then_some(category)
}

/// Metric-like columns with a high missing/non-numeric share.
fn check_missingness(
    headers: &[String],
    rows: &[Vec<String>],
    profile: &ProfileMeta,
) -> Option<WarningCategory> {
    let mut category = WarningCategory::new("high_missingness", "High missing share");

    for column in profile.columns.iter().filter(|c| c.inferred_type.is_metric_like()) {
        let Some(idx) = headers.iter().position(|h| h == &column.name) else {
            continue;
        };
        if rows.is_empty() {
            continue;
        }

        let unusable = rows
            .iter()
            .filter(|row| {
                row.get(idx)
                    .map(|cell| parse_number(cell).is_none())
                    .unwrap_or(true)
            })
            .count();
        let share = unusable as f64 / rows.len() as f64;
        if share >= MISSING_SHARE {
            category.record(Some(format!(
                "{}: {:.0}% missing or non-numeric",
                column.name,
                share * 100.0
            )));
        }
    }

    category.fired().then_some(category)
}

/// Structural failures: no headers or no rows at all.
fn check_parse_issues(headers: &[String], rows: &[Vec<String>]) -> Option<WarningCategory> {
    let mut category = WarningCategory::new("parse_issues", "Parse issues");
    if headers.is_empty() {
        category.record(Some("no header row detected".to_string()));
    }
    if rows.is_empty() {
        category.record(Some("no data rows detected".to_string()));
    }
    category.fired().then_some(category)
}

//! Statistical rollups over the chosen candidate: overall, by time, by group.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::profile::{Granularity, ParsedDate, ProfileMeta, parse_date, parse_number};

/// Time buckets retained.
const MAX_TIME_BUCKETS: usize = 24;

/// Groups retained.
const MAX_GROUPS: usize = 12;

/// Prefix marking a bucket keyed by a bare month label.
const MONTH_KEY_PREFIX: &str = "Month:";

/// Min/max/mean of one metric within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One time bucket with per-metric summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub time: String,
    /// Rows in the bucket, parseable or not.
    pub n: usize,
    pub metrics: IndexMap<String, MetricSummary>,
}

/// One group bucket with per-metric summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBucket {
    pub group: String,
    pub n: usize,
    pub metrics: IndexMap<String, MetricSummary>,
}

/// Exact rollups of the already-bounded row set. No sampling here: downstream
/// consumers need exact numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    /// Per-metric summary over all rows.
    pub overall: IndexMap<String, MetricSummary>,
    /// Chronologically ordered time buckets, at most 24.
    pub by_time: Vec<TimeBucket>,
    /// Groups by descending row count, at most 12.
    pub by_group: Vec<GroupBucket>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assumptions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub limitations: Vec<String>,
}

/// Running min/max/sum accumulator; local to one aggregation pass.
#[derive(Debug, Clone, Copy)]
struct MetricAcc {
    min: f64,
    max: f64,
    sum: f64,
    n: usize,
}

impl MetricAcc {
    fn new() -> Self {
        Self { min: f64::INFINITY, max: f64::NEG_INFINITY, sum: 0.0, n: 0 }
    }

    fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.n += 1;
    }

    fn summary(&self) -> Option<MetricSummary> {
        if self.n == 0 {
            return None;
        }
        Some(MetricSummary { min: self.min, max: self.max, mean: self.sum / self.n as f64 })
    }
}

/// How a time key sorts: parsed dates first, raw strings lexically after,
/// month labels last in first-seen order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeKeyOrder {
    Date(NaiveDate),
    Raw,
    MonthLabel,
}

impl TimeKeyOrder {
    fn tier(&self) -> u8 {
        match self {
            TimeKeyOrder::Date(_) => 0,
            TimeKeyOrder::Raw => 1,
            TimeKeyOrder::MonthLabel => 2,
        }
    }
}

/// Build all rollups in a single deterministic pass over the rows.
pub fn aggregate(headers: &[String], rows: &[Vec<String>], profile: &ProfileMeta) -> Aggregates {
    let metric_indices: Vec<(String, usize)> = profile
        .metric_columns
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .map(|idx| (name.clone(), idx))
        })
        .collect();

    let overall = aggregate_overall(rows, &metric_indices);

    let mut assumptions = Vec::new();
    let by_time = match profile
        .time_column
        .as_deref()
        .and_then(|name| headers.iter().position(|h| h == name))
    {
        Some(time_idx) => aggregate_by_time(rows, time_idx, &metric_indices, &mut assumptions),
        None => Vec::new(),
    };

    let group_idx = profile
        .group_columns
        .first()
        .and_then(|name| headers.iter().position(|h| h == name));
    let by_group = match group_idx {
        Some(idx) if !metric_indices.is_empty() => aggregate_by_group(rows, idx, &metric_indices),
        _ => Vec::new(),
    };

    let mut limitations = Vec::new();
    if metric_indices.is_empty() {
        limitations.push("no numeric metric columns detected".to_string());
    }
    if profile.time_column.is_none() {
        limitations.push("no time column detected; avoid time-based change claims".to_string());
    } else if !assumptions.is_empty() {
        limitations.push("time column is ambiguous; bucket order may not be chronological".to_string());
    }
    if profile.group_columns.is_empty() {
        limitations.push("no grouping column detected".to_string());
    }

    Aggregates { overall, by_time, by_group, assumptions, limitations }
}

fn aggregate_overall(
    rows: &[Vec<String>],
    metrics: &[(String, usize)],
) -> IndexMap<String, MetricSummary> {
    let mut accs: Vec<MetricAcc> = vec![MetricAcc::new(); metrics.len()];
    for row in rows {
        for (slot, (_, idx)) in metrics.iter().enumerate() {
            if let Some(cell) = row.get(*idx) {
                if let Some(parsed) = parse_number(cell) {
                    accs[slot].add(parsed.value);
                }
            }
        }
    }

    let mut overall = IndexMap::new();
    for ((name, _), acc) in metrics.iter().zip(&accs) {
        if let Some(summary) = acc.summary() {
            overall.insert(name.clone(), summary);
        }
    }
    overall
}

/// Bucket key for one time cell, plus how it sorts.
fn time_key(raw: &str) -> (String, TimeKeyOrder) {
    match parse_date(raw) {
        Some(ParsedDate::Date { date, granularity }) => {
            let key = match granularity {
                Granularity::Day => date.format("%Y-%m-%d").to_string(),
                Granularity::Month => date.format("%Y-%m").to_string(),
                Granularity::Year | Granularity::Unknown => date.format("%Y").to_string(),
            };
            (key, TimeKeyOrder::Date(date))
        }
        Some(ParsedDate::MonthLabel(label)) => {
            (format!("{MONTH_KEY_PREFIX}{label}"), TimeKeyOrder::MonthLabel)
        }
        None => (raw.to_string(), TimeKeyOrder::Raw),
    }
}

fn aggregate_by_time(
    rows: &[Vec<String>],
    time_idx: usize,
    metrics: &[(String, usize)],
    assumptions: &mut Vec<String>,
) -> Vec<TimeBucket> {
    // Local accumulator map; converted to an ordered sequence on exit.
    let mut buckets: IndexMap<String, (TimeKeyOrder, usize, Vec<MetricAcc>)> = IndexMap::new();

    for row in rows {
        let raw = row.get(time_idx).map(String::as_str).unwrap_or("").trim();
        if raw.is_empty() {
            continue;
        }
        let (key, order) = time_key(raw);
        let entry = buckets
            .entry(key)
            .or_insert_with(|| (order, 0, vec![MetricAcc::new(); metrics.len()]));
        entry.1 += 1;
        for (slot, (_, idx)) in metrics.iter().enumerate() {
            if let Some(cell) = row.get(*idx) {
                if let Some(parsed) = parse_number(cell) {
                    entry.2[slot].add(parsed.value);
                }
            }
        }
    }

    let any_dates = buckets.values().any(|(o, ..)| matches!(o, TimeKeyOrder::Date(_)));
    let any_labels = buckets.values().any(|(o, ..)| matches!(o, TimeKeyOrder::MonthLabel));
    if !buckets.is_empty() && !any_dates {
        if any_labels {
            assumptions.push(
                "time column holds month labels without years; buckets keep input order"
                    .to_string(),
            );
        } else {
            assumptions
                .push("time column did not parse as dates; buckets keyed by raw value".to_string());
        }
    }

    let mut ordered: Vec<(String, TimeKeyOrder, usize, Vec<MetricAcc>)> = buckets
        .into_iter()
        .map(|(key, (order, n, accs))| (key, order, n, accs))
        .collect();
    // Stable sort: month labels keep first-seen order inside their tier.
    ordered.sort_by(|a, b| {
        a.1.tier().cmp(&b.1.tier()).then_with(|| match (&a.1, &b.1) {
            (TimeKeyOrder::Date(da), TimeKeyOrder::Date(db)) => {
                da.cmp(db).then_with(|| a.0.cmp(&b.0))
            }
            (TimeKeyOrder::Raw, TimeKeyOrder::Raw) => a.0.cmp(&b.0),
            _ => std::cmp::Ordering::Equal,
        })
    });
    ordered.truncate(MAX_TIME_BUCKETS);

    ordered
        .into_iter()
        .map(|(time, _, n, accs)| TimeBucket {
            time,
            n,
            metrics: collect_metrics(metrics, &accs),
        })
        .collect()
}

fn aggregate_by_group(
    rows: &[Vec<String>],
    group_idx: usize,
    metrics: &[(String, usize)],
) -> Vec<GroupBucket> {
    let mut groups: IndexMap<String, (usize, Vec<MetricAcc>)> = IndexMap::new();

    for row in rows {
        let raw = row.get(group_idx).map(String::as_str).unwrap_or("").trim();
        let key = if raw.is_empty() { "Unknown".to_string() } else { raw.to_string() };
        let entry = groups
            .entry(key)
            .or_insert_with(|| (0, vec![MetricAcc::new(); metrics.len()]));
        entry.0 += 1;
        for (slot, (_, idx)) in metrics.iter().enumerate() {
            if let Some(cell) = row.get(*idx) {
                if let Some(parsed) = parse_number(cell) {
                    entry.1[slot].add(parsed.value);
                }
            }
        }
    }

    let mut ordered: Vec<(String, usize, Vec<MetricAcc>)> = groups
        .into_iter()
        .map(|(key, (n, accs))| (key, n, accs))
        .collect();
    // Stable by descending count; first-seen order breaks ties.
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered.truncate(MAX_GROUPS);

    ordered
        .into_iter()
        .map(|(group, n, accs)| GroupBucket {
            group,
            n,
            metrics: collect_metrics(metrics, &accs),
        })
        .collect()
}

fn collect_metrics(
    metrics: &[(String, usize)],
    accs: &[MetricAcc],
) -> IndexMap<String, MetricSummary> {
    let mut out = IndexMap::new();
    for ((name, _), acc) in metrics.iter().zip(accs) {
        if let Some(summary) = acc.summary() {
            out.insert(name.clone(), summary);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::TableCandidate;
    use crate::input::SourceKind;
    use crate::profile::profile;

    fn candidate(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> TableCandidate {
        TableCandidate {
            source_kind: SourceKind::Csv,
            sheet: None,
            region: None,
            header_row: 0,
            headers: headers.into_iter().map(String::from).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
            score: 0.8,
            notes: Vec::new(),
        }
    }

    #[test]
    fn test_overall_stats() {
        let c = candidate(
            vec!["Month", "Revenue"],
            vec![vec!["Jan", "100"], vec!["Feb", "120"], vec!["Mar", "90"]],
        );
        let meta = profile(&c);
        let aggregates = aggregate(&c.headers, &c.rows, &meta);
        let revenue = &aggregates.overall["Revenue"];
        assert_eq!(revenue.min, 90.0);
        assert_eq!(revenue.max, 120.0);
        assert!((revenue.mean - 103.333).abs() < 0.001);
    }

    #[test]
    fn test_month_label_buckets_keep_input_order() {
        let c = candidate(
            vec!["Month", "Revenue"],
            vec![vec!["Jan", "100"], vec!["Feb", "120"], vec!["Mar", "90"]],
        );
        let meta = profile(&c);
        let aggregates = aggregate(&c.headers, &c.rows, &meta);
        let times: Vec<&str> = aggregates.by_time.iter().map(|b| b.time.as_str()).collect();
        assert_eq!(times, vec!["Month:Jan", "Month:Feb", "Month:Mar"]);
        assert!(!aggregates.assumptions.is_empty());
    }

    #[test]
    fn test_chronological_buckets_sorted() {
        let c = candidate(
            vec!["day", "x", "value"],
            vec![
                vec!["2023-03-01", "a", "3"],
                vec!["2023-01-01", "a", "1"],
                vec!["2023-02-01", "b", "2"],
            ],
        );
        let meta = profile(&c);
        let aggregates = aggregate(&c.headers, &c.rows, &meta);
        let times: Vec<&str> = aggregates.by_time.iter().map(|b| b.time.as_str()).collect();
        assert_eq!(times, vec!["2023-01-01", "2023-02-01", "2023-03-01"]);
    }

    #[test]
    fn test_groups_sorted_by_count_desc() {
        let c = candidate(
            vec!["region", "value"],
            vec![
                vec!["North", "1"],
                vec!["South", "2"],
                vec!["South", "3"],
                vec!["South", "4"],
                vec!["North", "5"],
                vec!["", "6"],
            ],
        );
        let meta = profile(&c);
        let aggregates = aggregate(&c.headers, &c.rows, &meta);
        let groups: Vec<(&str, usize)> = aggregates
            .by_group
            .iter()
            .map(|g| (g.group.as_str(), g.n))
            .collect();
        assert_eq!(groups, vec![("South", 3), ("North", 2), ("Unknown", 1)]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let c = candidate(
            vec!["Month", "Revenue"],
            vec![vec!["Jan", "100"], vec!["Feb", "120"], vec!["Mar", "90"]],
        );
        let meta = profile(&c);
        let first = aggregate(&c.headers, &c.rows, &meta);
        let second = aggregate(&c.headers, &c.rows, &meta);
        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_limitations_note_missing_roles() {
        let c = candidate(
            vec!["name", "note"],
            vec![vec!["a", "hello"], vec!["b", "world"], vec!["c", "again"]],
        );
        let meta = profile(&c);
        let aggregates = aggregate(&c.headers, &c.rows, &meta);
        assert!(aggregates.limitations.iter().any(|l| l.contains("metric")));
        assert!(aggregates.limitations.iter().any(|l| l.contains("time")));
    }
}

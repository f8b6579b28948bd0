//! Date and month-label parsing with granularity classification.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Precision of a parsed date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
    /// No calendar anchoring could be established.
    Unknown,
}

/// English month names and abbreviations, mapped to month numbers.
static MONTH_NAMES: Lazy<Vec<(&'static str, u32)>> = Lazy::new(|| {
    vec![
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("sept", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ]
});

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([12]\d{3})$").unwrap());

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([12]\d{3})[-/](\d{1,2})$").unwrap());

static MONTH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\.?(?:[\s,/-]+([12]\d{3}))?$").unwrap());

/// Day-precision formats tried in order.
const DAY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Result of parsing one raw cell as a point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDate {
    /// A calendar date, precise to `granularity`.
    Date {
        date: NaiveDate,
        granularity: Granularity,
    },
    /// A bare English month name with no year. Flagged distinctly rather
    /// than treated as a calendar date.
    MonthLabel(String),
}

/// Parse a raw cell as a date or month label.
///
/// Recognizes bare years, `YYYY-MM`/`YYYY/MM`, English month names with an
/// optional year, and a fixed set of day-precision formats. Unparseable
/// values return `None` silently.
pub fn parse_date(raw: &str) -> Option<ParsedDate> {
    let s = raw.trim_start_matches('\u{feff}').trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = BARE_YEAR.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        return Some(ParsedDate::Date { date, granularity: Granularity::Year });
    }

    if let Some(caps) = YEAR_MONTH.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if (1..=12).contains(&month) {
            let date = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(ParsedDate::Date { date, granularity: Granularity::Month });
        }
        return None;
    }

    if let Some(caps) = MONTH_TOKEN.captures(s) {
        let word = caps[1].to_lowercase();
        if let Some(&(_, month)) = MONTH_NAMES.iter().find(|(name, _)| *name == word) {
            return match caps.get(2) {
                Some(year) => {
                    let year: i32 = year.as_str().parse().ok()?;
                    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
                    Some(ParsedDate::Date { date, granularity: Granularity::Month })
                }
                None => Some(ParsedDate::MonthLabel(s.to_string())),
            };
        }
    }

    for format in DAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(ParsedDate::Date { date, granularity: Granularity::Day });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> (NaiveDate, Granularity) {
        match parse_date(raw) {
            Some(ParsedDate::Date { date, granularity }) => (date, granularity),
            other => panic!("expected date for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_year() {
        let (d, g) = date("2023");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(g, Granularity::Year);
    }

    #[test]
    fn test_year_month() {
        let (d, g) = date("2023-05");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_eq!(g, Granularity::Month);
        let (d, _) = date("2023/5");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    #[test]
    fn test_month_name_with_year() {
        let (d, g) = date("Jan 2023");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(g, Granularity::Month);
        let (d, _) = date("September, 2021");
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 9, 1).unwrap());
        let (d, _) = date("Mar-2020");
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
    }

    #[test]
    fn test_bare_month_name_is_a_label() {
        assert_eq!(
            parse_date("Jan"),
            Some(ParsedDate::MonthLabel("Jan".to_string()))
        );
        assert_eq!(
            parse_date("February"),
            Some(ParsedDate::MonthLabel("February".to_string()))
        );
    }

    #[test]
    fn test_day_precision_formats() {
        let (d, g) = date("2023-05-12");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 5, 12).unwrap());
        assert_eq!(g, Granularity::Day);
        let (d, _) = date("12/05/2023");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 5, 12).unwrap());
        let (d, _) = date("Jan 5, 2023");
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    }

    #[test]
    fn test_rejects_non_dates() {
        assert!(parse_date("hello").is_none());
        assert!(parse_date("123").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("13/13/2023").is_none());
    }
}

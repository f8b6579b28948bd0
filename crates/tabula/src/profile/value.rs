//! Locale-tolerant numeric value parsing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Currency symbols stripped before numeric parsing.
const CURRENCY_SYMBOLS: &[char] = &['£', '$', '€', '¥'];

/// A lone comma is a decimal separator only in this shape; otherwise it is a
/// thousands separator and dropped.
static COMMA_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+,\d{1,2}$").unwrap());

/// Result of parsing one raw cell as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNumber {
    pub value: f64,
    /// The raw cell carried a currency symbol.
    pub is_currency: bool,
    /// The raw cell carried a percent sign.
    pub is_percent: bool,
}

/// Parse a raw cell as a number.
///
/// The pipeline strips BOM/whitespace, converts parenthesized negatives,
/// strips currency symbols and percent signs, normalizes decimal separators
/// (when both `,` and `.` appear, the later one is the decimal separator) and
/// applies `k`/`m`/`b` suffix multipliers. A value is numeric iff the result
/// is a finite number; anything else returns `None` rather than an error.
pub fn parse_number(raw: &str) -> Option<ParsedNumber> {
    let mut s = raw.trim_start_matches('\u{feff}').trim().to_string();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        negative = true;
        s = s[1..s.len() - 1].trim().to_string();
    }

    let is_currency = s.chars().any(|c| CURRENCY_SYMBOLS.contains(&c));
    if is_currency {
        s.retain(|c| !CURRENCY_SYMBOLS.contains(&c));
        s = s.trim().to_string();
    }

    let is_percent = s.contains('%');
    if is_percent {
        s.retain(|c| c != '%');
        s = s.trim().to_string();
    }

    let mut multiplier = 1.0;
    if let Some(last) = s.chars().last() {
        match last.to_ascii_lowercase() {
            'k' => multiplier = 1e3,
            'm' => multiplier = 1e6,
            'b' => multiplier = 1e9,
            _ => {}
        }
        if multiplier != 1.0 {
            s.pop();
            s = s.trim().to_string();
        }
    }

    let has_comma = s.contains(',');
    let has_dot = s.contains('.');
    let normalized = if has_comma && has_dot {
        // The later separator is the decimal one.
        if s.rfind(',') > s.rfind('.') {
            s.replace('.', "").replace(',', ".")
        } else {
            s.replace(',', "")
        }
    } else if has_comma {
        if COMMA_DECIMAL.is_match(&s) {
            s.replace(',', ".")
        } else {
            s.replace(',', "")
        }
    } else {
        s
    };

    // `f64::from_str` accepts "inf"/"NaN"; is_finite rejects both.
    let parsed: f64 = normalized.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }

    let mut value = parsed * multiplier;
    if negative {
        value = -value;
    }
    Some(ParsedNumber { value, is_currency, is_percent })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(raw: &str) -> f64 {
        parse_number(raw).unwrap().value
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(value("42"), 42.0);
        assert_eq!(value("-3.5"), -3.5);
        assert_eq!(value("  7 "), 7.0);
    }

    #[test]
    fn test_thousands_and_decimal_separators() {
        assert_eq!(value("1,234.56"), 1234.56);
        assert_eq!(value("1.234,56"), 1234.56);
        assert_eq!(value("1,234"), 1234.0);
        assert_eq!(value("1,5"), 1.5);
    }

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(value("(500)"), -500.0);
        assert_eq!(value("($1,200)"), -1200.0);
    }

    #[test]
    fn test_percent_flag() {
        let parsed = parse_number("45%").unwrap();
        assert_eq!(parsed.value, 45.0);
        assert!(parsed.is_percent);
        assert!(!parsed.is_currency);
    }

    #[test]
    fn test_currency_with_suffix_multiplier() {
        let parsed = parse_number("£1.2k").unwrap();
        assert_eq!(parsed.value, 1200.0);
        assert!(parsed.is_currency);
        assert_eq!(value("3M"), 3_000_000.0);
        assert_eq!(value("2b"), 2e9);
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert!(parse_number("abc").is_none());
        assert!(parse_number("").is_none());
        assert!(parse_number("12abc").is_none());
        assert!(parse_number("NaN").is_none());
        assert!(parse_number("inf").is_none());
    }
}

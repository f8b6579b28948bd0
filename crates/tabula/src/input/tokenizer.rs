//! Delimited-text tokenizer with quote-aware delimiter detection.

use super::grid::Grid;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Logical lines sampled when scoring delimiters.
const DETECT_SAMPLE_LINES: usize = 20;

/// Hard cap on parsed rows for delimited text.
const MAX_TEXT_ROWS: usize = 5_000;

/// Weight of the count-spread penalty in the delimiter score.
const SPREAD_PENALTY: f64 = 0.7;

/// Split text into logical lines: a newline inside an open quote does not end
/// a line, and a doubled quote is a literal quote character. Blank lines are
/// skipped. At most `max` lines are returned.
fn logical_lines(raw: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push_str("\"\"");
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                    current.push('"');
                }
            }
            '\n' if !in_quotes => {
                let line = current.trim_end_matches('\r');
                if !line.trim().is_empty() {
                    lines.push(line.to_string());
                }
                current.clear();
                if lines.len() >= max {
                    return lines;
                }
            }
            _ => current.push(ch),
        }
    }

    let line = current.trim_end_matches('\r');
    if !line.trim().is_empty() {
        lines.push(line.to_string());
    }
    lines
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

/// Detect the most plausible delimiter over the first sampled logical lines.
///
/// Each candidate is scored `mean - 0.7 * stdev` of its quote-aware per-line
/// counts; the highest score wins. Defaults to comma when fewer than 2
/// logical lines exist.
pub fn detect_delimiter(raw: &str) -> u8 {
    let lines = logical_lines(raw, DETECT_SAMPLE_LINES);
    if lines.len() < 2 {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = f64::NEG_INFINITY;

    for &delim in DELIMITERS {
        let counts: Vec<f64> = lines
            .iter()
            .map(|line| count_outside_quotes(line, delim) as f64)
            .collect();

        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let score = mean - SPREAD_PENALTY * variance.sqrt();

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Tokenize raw delimited text into a grid of trimmed cells.
///
/// Rows are split with a quote-aware reader using the detected delimiter;
/// fields are trimmed, blank-only rows are dropped and at most 5,000 rows are
/// kept. Text with fewer than 2 usable rows yields an empty grid rather than
/// an error; the caller treats that as "no candidate".
pub fn tokenize_text(raw: &str) -> Grid {
    let raw = raw.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(raw);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        // Malformed records are skipped, not fatal.
        let Ok(record) = result else { continue };

        let row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(row);
        if rows.len() >= MAX_TEXT_ROWS {
            break;
        }
    }

    if rows.len() < 2 {
        return Grid::default();
    }
    Grid::new(rows)
}

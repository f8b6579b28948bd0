//! The `analyze` command: run the full pipeline over a file and print the
//! result.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tabula::{AnalysisReport, ConfidenceLevel, SourceKind, Tabula};

use crate::cli::KindChoice;

pub fn run(
    file: PathBuf,
    kind: Option<KindChoice>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn Error>> {
    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let engine = Tabula::new();
    let report = if matches!(extension.as_str(), "xlsx" | "xls") {
        let bytes = fs::read(&file)?;
        engine.analyze_workbook(&bytes)?
    } else {
        let raw = fs::read_to_string(&file)?;
        let kind = kind
            .map(KindChoice::to_source_kind)
            .unwrap_or_else(|| kind_from_extension(&extension));
        engine.analyze_text(&raw, kind)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report, verbose);
    Ok(())
}

/// Map a file extension to a source kind; unknown extensions count as pasted
/// text.
fn kind_from_extension(extension: &str) -> SourceKind {
    match extension {
        "csv" => SourceKind::Csv,
        "tsv" => SourceKind::Tsv,
        "txt" => SourceKind::Txt,
        _ => SourceKind::Paste,
    }
}

fn print_summary(report: &AnalysisReport, verbose: bool) {
    println!(
        "{} {} rows x {} columns (score {:.2})",
        "Table:".bold(),
        report.table.row_count(),
        report.table.column_count(),
        report.table.score
    );
    if let Some(sheet) = &report.table.sheet {
        println!("{} {}", "Sheet:".bold(), sheet);
    }

    println!("\n{}", "Columns".bold());
    for column in &report.profile.columns {
        println!(
            "  {:<24} {:<12} missing {:>5.1}%  unique {}",
            column.name,
            format!("{:?}", column.inferred_type).to_lowercase(),
            column.missing_pct,
            column.unique_count
        );
    }

    println!("\n{}", "Roles".bold());
    println!(
        "  time: {}",
        report.profile.time_column.as_deref().unwrap_or("-")
    );
    println!("  groups: {}", join_or_dash(&report.profile.group_columns));
    println!("  metrics: {}", join_or_dash(&report.profile.metric_columns));

    if !report.aggregates.by_time.is_empty() {
        println!(
            "\n{} {} buckets",
            "Time rollup:".bold(),
            report.aggregates.by_time.len()
        );
    }
    if !report.aggregates.by_group.is_empty() {
        println!(
            "{} {} groups",
            "Group rollup:".bold(),
            report.aggregates.by_group.len()
        );
    }

    println!("\n{}", "Warnings".bold());
    if report.warnings.categories.is_empty() {
        println!("  {}", report.warnings.headline.green());
    } else {
        for category in &report.warnings.categories {
            println!("  {} ({})", category.label.yellow(), category.count);
            if verbose {
                for example in &category.examples {
                    println!("    - {example}");
                }
            }
        }
    }

    let level = match report.confidence.level {
        ConfidenceLevel::High => "High".green(),
        ConfidenceLevel::Medium => "Medium".yellow(),
        ConfidenceLevel::Low => "Low".red(),
    };
    println!(
        "\n{} {} ({:?}, score {:.2}, {} metric columns)",
        "Confidence:".bold(),
        level,
        report.confidence.reason_code,
        report.confidence.metrics.score,
        report.confidence.metrics.metric_columns
    );
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_from_extension("csv"), SourceKind::Csv);
        assert_eq!(kind_from_extension("tsv"), SourceKind::Tsv);
        assert_eq!(kind_from_extension("dat"), SourceKind::Paste);
    }

    #[test]
    fn test_analyze_csv_file() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Month,Revenue").unwrap();
        writeln!(file, "Jan,100").unwrap();
        writeln!(file, "Feb,120").unwrap();
        writeln!(file, "Mar,90").unwrap();

        let result = run(file.path().to_path_buf(), None, true, false);
        assert!(result.is_ok());
    }
}

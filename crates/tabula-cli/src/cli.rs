//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tabula: schema-free tabular extraction and profiling
#[derive(Parser)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a data file and print the structural report
    Analyze {
        /// Path to the data file (CSV/TSV/TXT/XLS/XLSX)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the source kind (default: inferred from extension)
        #[arg(short, long)]
        kind: Option<KindChoice>,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

/// Source kind as selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindChoice {
    Paste,
    Csv,
    Tsv,
    Txt,
}

impl KindChoice {
    pub fn to_source_kind(self) -> tabula::SourceKind {
        match self {
            KindChoice::Paste => tabula::SourceKind::Paste,
            KindChoice::Csv => tabula::SourceKind::Csv,
            KindChoice::Tsv => tabula::SourceKind::Tsv,
            KindChoice::Txt => tabula::SourceKind::Txt,
        }
    }
}

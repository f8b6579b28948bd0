//! Tabula: schema-free tabular extraction and profiling engine.
//!
//! Given raw delimited text or XLS/XLSX bytes with no known schema, Tabula
//! locates the most plausible rectangular table(s), scores competing
//! interpretations, infers per-column types and statistics, builds time- and
//! group-based rollups, and flags internally-inconsistent data. Everything is
//! a pure function over immutable inputs: no network, no I/O, and the same
//! bytes always produce the same result.
//!
//! # Example
//!
//! ```
//! use tabula::{SourceKind, Tabula};
//!
//! let engine = Tabula::new();
//! let report = engine
//!     .analyze_text("Month,Revenue\nJan,100\nFeb,120\nMar,90", SourceKind::Csv)
//!     .unwrap();
//!
//! assert_eq!(report.table.headers, vec!["Month", "Revenue"]);
//! assert_eq!(report.profile.metric_columns, vec!["Revenue"]);
//! ```

mod aggregate;
mod candidate;
mod confidence;
mod error;
mod extract;
mod input;
mod profile;
mod sanity;
mod tabula;

pub use crate::aggregate::{Aggregates, GroupBucket, MetricSummary, TimeBucket, aggregate};
pub use crate::candidate::TableCandidate;
pub use crate::confidence::{
    ConfidenceLevel, ConfidenceMetrics, ConfidenceResult, ReasonCode, confidence,
};
pub use crate::error::{Result, TabulaError};
pub use crate::extract::{extract_from_text, extract_from_workbook, select_best};
pub use crate::input::{Grid, Region, SourceKind, detect_delimiter, tokenize_text};
pub use crate::profile::{
    ColumnKind, ColumnProfile, DateStats, Granularity, NumericStats, ParsedDate, ParsedNumber,
    ProfileMeta, parse_date, parse_number, profile,
};
pub use crate::sanity::{WarningCategory, WarningReport, check_warnings};
pub use crate::tabula::{AnalysisReport, CandidateSummary, SourceSummary, Tabula, TabulaConfig};

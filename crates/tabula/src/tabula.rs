//! Engine facade: extraction, profiling, aggregation and checks in one call.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::aggregate::{Aggregates, aggregate};
use crate::candidate::TableCandidate;
use crate::confidence::{ConfidenceResult, confidence};
use crate::error::{Result, TabulaError};
use crate::extract::{extract_from_text, extract_from_workbook};
use crate::input::SourceKind;
use crate::profile::{ProfileMeta, profile};
use crate::sanity::{WarningReport, check_warnings};

/// Configuration for an analysis run.
#[derive(Debug, Clone)]
pub struct TabulaConfig {
    /// Rows included verbatim in the report for downstream grounding.
    pub sample_rows: usize,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self { sample_rows: 20 }
    }
}

/// What the input bytes were, before any interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub kind: SourceKind,
    /// SHA-256 of the input bytes; identical input always hashes identically.
    pub hash: String,
    pub size_bytes: usize,
    /// Rows of the chosen table.
    pub row_count: usize,
    /// Columns of the chosen table.
    pub column_count: usize,
}

/// Compact view of one ranked candidate, kept for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub header_row: usize,
    pub columns: usize,
    pub rows: usize,
    pub score: f64,
}

impl CandidateSummary {
    fn of(candidate: &TableCandidate) -> Self {
        Self {
            sheet: candidate.sheet.clone(),
            header_row: candidate.header_row,
            columns: candidate.column_count(),
            rows: candidate.row_count(),
            score: candidate.score,
        }
    }
}

/// Everything downstream consumers need: the chosen table, its profile,
/// rollups, warnings, verdict and a deterministic row sample.
///
/// Serialized as JSON this is the grounded pack handed to the external
/// text-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: SourceSummary,
    /// All ranked candidates, best first.
    pub candidates: Vec<CandidateSummary>,
    /// The authoritative candidate used for everything below.
    pub table: TableCandidate,
    pub profile: ProfileMeta,
    pub aggregates: Aggregates,
    pub warnings: WarningReport,
    pub confidence: ConfidenceResult,
    /// First rows of the chosen table, verbatim.
    pub sample_rows: Vec<Vec<String>>,
}

impl AnalysisReport {
    /// Serialize the report as the JSON grounded pack handed to downstream
    /// consumers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The main analysis engine.
///
/// Stateless between calls; the same bytes always produce the same report.
pub struct Tabula {
    config: TabulaConfig,
}

impl Tabula {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(TabulaConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: TabulaConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline over raw delimited text.
    pub fn analyze_text(&self, raw: &str, kind: SourceKind) -> Result<AnalysisReport> {
        let candidates = extract_from_text(raw, kind);
        self.finish(kind, raw.as_bytes(), raw, candidates)
    }

    /// Run the full pipeline over XLS/XLSX workbook bytes.
    pub fn analyze_workbook(&self, bytes: &[u8]) -> Result<AnalysisReport> {
        let candidates = extract_from_workbook(bytes)?;
        self.finish(SourceKind::Excel, bytes, "", candidates)
    }

    fn finish(
        &self,
        kind: SourceKind,
        bytes: &[u8],
        raw_text: &str,
        candidates: Vec<TableCandidate>,
    ) -> Result<AnalysisReport> {
        // Candidates arrive ranked; the first is the authoritative choice.
        let Some(table) = candidates.first().cloned() else {
            return Err(TabulaError::NoCandidate);
        };

        let profile = profile(&table);
        let aggregates = aggregate(&table.headers, &table.rows, &profile);
        let warnings = check_warnings(raw_text, &table.headers, &table.rows, &profile);
        let confidence = confidence(&table, &profile);

        let sample_rows = table
            .rows
            .iter()
            .take(self.config.sample_rows)
            .cloned()
            .collect();

        let source = SourceSummary {
            kind,
            hash: hash_bytes(bytes),
            size_bytes: bytes.len(),
            row_count: table.row_count(),
            column_count: table.column_count(),
        };

        Ok(AnalysisReport {
            source,
            candidates: candidates.iter().map(CandidateSummary::of).collect(),
            table,
            profile,
            aggregates,
            warnings,
            confidence,
            sample_rows,
        })
    }
}

impl Default for Tabula {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

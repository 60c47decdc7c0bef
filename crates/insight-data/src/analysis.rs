//! Main analysis pipeline for Campaign Insight.
//!
//! Orchestrates loading, per-segment aggregation, significance testing and
//! profiling, returning an [`AnalysisResult`] ready for the report layer.

use std::path::Path;

use chrono::Utc;
use insight_core::error::{InsightError, Result};
use insight_core::models::{ComparisonResult, OverallSummary, SegmentMetrics};
use tracing::warn;

use crate::aggregator::SegmentAggregator;
use crate::overview::{build_overview, DatasetOverview};
use crate::profiling::{self, SegmentBreakdown, SpendProfile};
use crate::reader::load_records;
use crate::significance::SignificanceTester;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// The dataset path that was analysed.
    pub data_path: String,
    /// Number of campaign records loaded.
    pub records_loaded: usize,
    /// Wall-clock seconds spent loading the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent computing the report sections.
    pub compute_time_seconds: f64,
}

/// The complete output of [`analyze_campaign`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisResult {
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
    /// Descriptive overview of the raw dataset.
    pub overview: DatasetOverview,
    /// Per-segment performance metrics, sorted by segment label.
    pub metrics: Vec<SegmentMetrics>,
    /// Dataset-wide headline numbers.
    pub overall: OverallSummary,
    /// The best-converting segment; `None` when the dataset is empty.
    pub winner: Option<SegmentMetrics>,
    /// Pairwise significance tests, one per pair of segments present.
    pub comparisons: Vec<ComparisonResult>,
    /// Deep-dive tables, one per requested demographic attribute.
    pub breakdowns: Vec<SegmentBreakdown>,
    /// Conversion by customer value tier; `None` when the tiers are
    /// undefined for this dataset.
    pub spend_profile: Option<SpendProfile>,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Load campaign records from `data_path`.
/// 2. Aggregate per-segment metrics, the overall summary and the winner.
/// 3. Run pairwise significance tests over the segments present.
/// 4. Build the dataset overview and the profiling sections.
/// 5. Return an [`AnalysisResult`].
///
/// `breakdown` selects the deep-dive attribute (a dataset column name, or
/// `"all"`); `sample_rows` caps the overview's head sample. Every failure is
/// fatal to the run except an undefined spend profile, which degrades to a
/// logged warning and an absent section.
pub fn analyze_campaign(
    data_path: &Path,
    breakdown: &str,
    sample_rows: usize,
) -> Result<AnalysisResult> {
    let attributes = profiling::parse_selection(breakdown).ok_or_else(|| {
        InsightError::Config(format!("unknown breakdown attribute '{breakdown}'"))
    })?;

    // ── Step 1: Load records ──────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let records = load_records(data_path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Aggregate segments ────────────────────────────────────────────
    let compute_start = std::time::Instant::now();
    let metrics = SegmentAggregator::aggregate(&records);
    let overall = SegmentAggregator::overall_summary(&records);
    let winner = SegmentAggregator::winner(&metrics).cloned();

    // ── Step 3: Significance tests ────────────────────────────────────────────
    let comparisons = SignificanceTester::compare_segments(&records)?;

    // ── Step 4: Overview and profiling ────────────────────────────────────────
    let overview = build_overview(&records, sample_rows);
    let breakdowns = attributes
        .iter()
        .map(|&attribute| profiling::segment_breakdown(&records, attribute))
        .collect();
    let spend_profile = match profiling::spend_profile(&records) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Spend profile unavailable: {e}");
            None
        }
    };
    let compute_time = compute_start.elapsed().as_secs_f64();

    // ── Step 5: Build result ──────────────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        data_path: data_path.display().to_string(),
        records_loaded: records.len(),
        load_time_seconds: load_time,
        compute_time_seconds: compute_time,
    };

    Ok(AnalysisResult {
        metadata,
        overview,
        metrics,
        overall,
        winner,
        comparisons,
        breakdowns,
        spend_profile,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Descriptive overview of the loaded dataset.
//!
//! Summarizes each numeric column (count, mean, spread, quartiles), counts
//! missing values per column, and keeps a small head sample so the report can
//! show what the raw rows look like.

use insight_core::models::CampaignRecord;
use insight_core::stats;
use serde::{Deserialize, Serialize};

use crate::reader::REQUIRED_COLUMNS;

// ── ColumnSummary ─────────────────────────────────────────────────────────────

/// Descriptive statistics for one numeric column, computed over the
/// non-missing values only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Number of non-missing values.
    pub count: u64,
    pub mean: f64,
    /// Sample standard deviation (n - 1). NaN with fewer than two values.
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Missing-value count for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: u64,
}

/// The dataset overview section of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub row_count: u64,
    pub column_count: u64,
    /// One summary per numeric column, in dataset column order.
    pub summaries: Vec<ColumnSummary>,
    /// One entry per dataset column, in dataset column order.
    pub missing_counts: Vec<MissingCount>,
    /// The first rows of the dataset, capped at the requested sample size.
    pub sample: Vec<CampaignRecord>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Build the dataset overview over `records`, sampling at most
/// `sample_rows` head rows.
pub fn build_overview(records: &[CampaignRecord], sample_rows: usize) -> DatasetOverview {
    let summaries = numeric_columns(records)
        .into_iter()
        .map(|(column, values)| summarize_column(column, values))
        .collect();

    let missing_counts = REQUIRED_COLUMNS
        .iter()
        .map(|&column| MissingCount {
            column: column.to_string(),
            missing: missing_in_column(records, column),
        })
        .collect();

    DatasetOverview {
        row_count: records.len() as u64,
        column_count: REQUIRED_COLUMNS.len() as u64,
        summaries,
        missing_counts,
        sample: records.iter().take(sample_rows).cloned().collect(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// The numeric columns and their non-missing values, in dataset column order.
/// Boolean flags count as 0/1 numerics, the way the raw file stores them.
fn numeric_columns(records: &[CampaignRecord]) -> Vec<(&'static str, Vec<f64>)> {
    vec![
        ("visit", records.iter().map(|r| flag(r.visited)).collect()),
        (
            "conversion",
            records.iter().map(|r| flag(r.converted)).collect(),
        ),
        ("spend", recorded(records.iter().map(|r| r.spend))),
        (
            "history_spend",
            recorded(records.iter().map(|r| r.history_spend)),
        ),
        (
            "acquired_in_last_year",
            records.iter().map(|r| flag(r.acquired_in_last_year)).collect(),
        ),
        (
            "history_footwear",
            records.iter().map(|r| flag(r.history_footwear)).collect(),
        ),
        (
            "history_apparel",
            records.iter().map(|r| flag(r.history_apparel)).collect(),
        ),
    ]
}

fn summarize_column(column: &'static str, mut values: Vec<f64>) -> ColumnSummary {
    let count = values.len() as u64;
    let mean = stats::mean(&values);
    let std_dev = stats::sample_std(&values);
    // Values are filtered to finite before they get here.
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());

    ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std_dev,
        min: stats::quantile(&values, 0.0),
        q25: stats::quantile(&values, 0.25),
        median: stats::quantile(&values, 0.5),
        q75: stats::quantile(&values, 0.75),
        max: stats::quantile(&values, 1.0),
    }
}

/// Missing cells in `column`. Only the spend columns can be missing once a
/// row has parsed; every other column is structurally present.
fn missing_in_column(records: &[CampaignRecord], column: &str) -> u64 {
    match column {
        "spend" => count_missing(records.iter().map(|r| r.spend)),
        "history_spend" => count_missing(records.iter().map(|r| r.history_spend)),
        _ => 0,
    }
}

fn count_missing<I: Iterator<Item = Option<f64>>>(values: I) -> u64 {
    values.filter(|v| !v.is_some_and(|x| x.is_finite())).count() as u64
}

/// Non-missing, finite values only.
fn recorded<I: Iterator<Item = Option<f64>>>(values: I) -> Vec<f64> {
    values.flatten().filter(|v| v.is_finite()).collect()
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

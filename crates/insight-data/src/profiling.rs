//! Demographic and value-tier profiling of campaign performance.
//!
//! Two deeper cuts of the dataset: conversion behaviour by campaign segment
//! crossed with a demographic attribute, and conversion behaviour by customer
//! value tier (terciles of historical spend).

use std::collections::BTreeMap;

use insight_core::error::{InsightError, Result};
use insight_core::models::{CampaignRecord, Segment, SpendTier};
use insight_core::stats;
use serde::{Deserialize, Serialize};

// ── BreakdownAttribute ────────────────────────────────────────────────────────

/// Demographic attribute the deep dive can cut the segments by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownAttribute {
    AcquiredInLastYear,
    AddressCategory,
    HistoryFootwear,
    HistoryApparel,
}

impl BreakdownAttribute {
    /// Every attribute, in dataset column order.
    pub const ALL: [BreakdownAttribute; 4] = [
        BreakdownAttribute::AcquiredInLastYear,
        BreakdownAttribute::AddressCategory,
        BreakdownAttribute::HistoryFootwear,
        BreakdownAttribute::HistoryApparel,
    ];

    /// The dataset column this attribute reads.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::AcquiredInLastYear => "acquired_in_last_year",
            Self::AddressCategory => "address_category",
            Self::HistoryFootwear => "history_footwear",
            Self::HistoryApparel => "history_apparel",
        }
    }

    fn value_of(&self, record: &CampaignRecord) -> String {
        match self {
            Self::AcquiredInLastYear => flag_label(record.acquired_in_last_year),
            Self::AddressCategory => record.address_category.clone(),
            Self::HistoryFootwear => flag_label(record.history_footwear),
            Self::HistoryApparel => flag_label(record.history_apparel),
        }
    }
}

/// Resolve the `--breakdown` flag value into the attributes to report.
///
/// `"all"` selects every attribute; a column name selects just that one;
/// anything else is `None`.
pub fn parse_selection(flag: &str) -> Option<Vec<BreakdownAttribute>> {
    if flag == "all" {
        return Some(BreakdownAttribute::ALL.to_vec());
    }
    BreakdownAttribute::ALL
        .iter()
        .find(|attribute| attribute.column_name() == flag)
        .map(|attribute| vec![*attribute])
}

// ── Segmentation deep dive ────────────────────────────────────────────────────

/// One (segment, attribute value) cell of the deep dive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub segment: Segment,
    /// The attribute value, as it appears in the dataset (`"0"`/`"1"` for
    /// the flag columns).
    pub value: String,
    pub user_count: u64,
    pub conversion_rate: f64,
    /// Mean spend over the cell's recorded spend values; NaN when none.
    pub avg_spend: f64,
}

/// Deep-dive table for one demographic attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    /// The dataset column the rows are cut by.
    pub attribute: String,
    pub rows: Vec<BreakdownRow>,
}

/// Cross campaign segments with `attribute` and compute conversion rate and
/// average spend per cell. Rows come out sorted by segment label, then by
/// attribute value.
pub fn segment_breakdown(
    records: &[CampaignRecord],
    attribute: BreakdownAttribute,
) -> SegmentBreakdown {
    let mut cells: BTreeMap<(Segment, String), CellAccumulator> = BTreeMap::new();

    for record in records {
        cells
            .entry((record.segment, attribute.value_of(record)))
            .or_default()
            .add_record(record);
    }

    SegmentBreakdown {
        attribute: attribute.column_name().to_string(),
        rows: cells
            .into_iter()
            .map(|((segment, value), cell)| BreakdownRow {
                segment,
                value,
                user_count: cell.total,
                conversion_rate: cell.conversion_rate(),
                avg_spend: cell.avg_spend(),
            })
            .collect(),
    }
}

// ── Spend profile ─────────────────────────────────────────────────────────────

/// One (segment, value tier) cell of the spend profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRow {
    pub segment: Segment,
    pub tier: SpendTier,
    pub user_count: u64,
    pub conversion_rate: f64,
}

/// Conversion behaviour by customer value tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendProfile {
    /// Tier boundaries over historical spend:
    /// `[min, lower tercile, upper tercile, max]`.
    pub boundaries: [f64; 4],
    pub rows: Vec<TierRow>,
}

/// Assign each customer a value tier by tercile of historical spend, then
/// compute the conversion rate per (segment, tier) cell.
///
/// Customers without a recorded `history_spend` receive no tier and drop out
/// of this profile only. Fails with [`InsightError::DegenerateBins`] when the
/// data cannot support three distinct tiers, either because no historical
/// spend was recorded at all or because the tercile boundaries collide.
pub fn spend_profile(records: &[CampaignRecord]) -> Result<SpendProfile> {
    let mut history: Vec<f64> = records
        .iter()
        .filter_map(|r| r.history_spend)
        .filter(|v| v.is_finite())
        .collect();

    if history.is_empty() {
        return Err(InsightError::DegenerateBins(
            "no historical spend values recorded".to_string(),
        ));
    }
    history.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let boundaries = [
        history[0],
        stats::quantile(&history, 1.0 / 3.0),
        stats::quantile(&history, 2.0 / 3.0),
        history[history.len() - 1],
    ];
    if boundaries.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(InsightError::DegenerateBins(
            "tier boundaries are not distinct".to_string(),
        ));
    }

    let mut cells: BTreeMap<(Segment, SpendTier), CellAccumulator> = BTreeMap::new();
    for record in records {
        let Some(value) = record.history_spend.filter(|v| v.is_finite()) else {
            continue;
        };
        cells
            .entry((record.segment, tier_for(value, &boundaries)))
            .or_default()
            .add_record(record);
    }

    Ok(SpendProfile {
        boundaries,
        rows: cells
            .into_iter()
            .map(|((segment, tier), cell)| TierRow {
                segment,
                tier,
                user_count: cell.total,
                conversion_rate: cell.conversion_rate(),
            })
            .collect(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Running totals for one profiling cell.
#[derive(Debug, Clone, Default)]
struct CellAccumulator {
    total: u64,
    conversions: u64,
    spend_sum: f64,
    spend_count: u64,
}

impl CellAccumulator {
    fn add_record(&mut self, record: &CampaignRecord) {
        self.total += 1;
        if record.converted {
            self.conversions += 1;
        }
        if let Some(spend) = record.spend {
            self.spend_sum += spend;
            self.spend_count += 1;
        }
    }

    fn conversion_rate(&self) -> f64 {
        self.conversions as f64 / self.total as f64
    }

    fn avg_spend(&self) -> f64 {
        if self.spend_count == 0 {
            f64::NAN
        } else {
            self.spend_sum / self.spend_count as f64
        }
    }
}

/// The lowest tier is closed on the left; the others are half-open `(lo, hi]`.
fn tier_for(value: f64, boundaries: &[f64; 4]) -> SpendTier {
    if value <= boundaries[1] {
        SpendTier::Low
    } else if value <= boundaries[2] {
        SpendTier::Medium
    } else {
        SpendTier::High
    }
}

fn flag_label(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

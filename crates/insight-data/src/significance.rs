//! Pairwise statistical significance tests between campaign segments.
//!
//! For every pair of segments present in the data this runs chi-square
//! independence tests on the visit and conversion contingency tables, and a
//! two-sample Student's t-test on recorded spend.

use std::collections::BTreeMap;

use insight_core::error::{InsightError, Result};
use insight_core::models::{CampaignRecord, ComparisonResult, Segment};
use insight_core::stats;
use tracing::debug;

// ── SegmentSample ─────────────────────────────────────────────────────────────

/// Per-segment counts and spend values feeding the pairwise tests.
#[derive(Debug, Clone, Default)]
struct SegmentSample {
    total: u64,
    visits: u64,
    conversions: u64,
    spend: Vec<f64>,
}

impl SegmentSample {
    fn add_record(&mut self, record: &CampaignRecord) {
        self.total += 1;
        if record.visited {
            self.visits += 1;
        }
        if record.converted {
            self.conversions += 1;
        }
        if let Some(spend) = record.spend {
            self.spend.push(spend);
        }
    }
}

// ── SignificanceTester ────────────────────────────────────────────────────────

/// Stateless helper that runs the pairwise segment comparisons.
pub struct SignificanceTester;

impl SignificanceTester {
    /// Compare every unordered pair of segments present in `records`.
    ///
    /// Pairs are emitted in label order, so a dataset with all three
    /// segments yields Apparel vs Footwear, Apparel vs No Email and
    /// Footwear vs No Email. Fails with [`InsightError::DegenerateTable`]
    /// when a contingency table has a zero row or column total, which
    /// leaves the chi-square test undefined. A spend t-test that cannot be
    /// computed (fewer than two recorded values on a side) reports NaN
    /// instead of failing.
    pub fn compare_segments(records: &[CampaignRecord]) -> Result<Vec<ComparisonResult>> {
        let mut samples: BTreeMap<Segment, SegmentSample> = BTreeMap::new();
        for record in records {
            samples.entry(record.segment).or_default().add_record(record);
        }

        let segments: Vec<Segment> = samples.keys().copied().collect();
        let mut results = Vec::new();

        for (index, &left) in segments.iter().enumerate() {
            for &right in &segments[index + 1..] {
                results.push(Self::compare_pair(
                    left,
                    &samples[&left],
                    right,
                    &samples[&right],
                )?);
            }
        }

        debug!("Ran significance tests for {} segment pairs", results.len());

        Ok(results)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn compare_pair(
        left: Segment,
        left_sample: &SegmentSample,
        right: Segment,
        right_sample: &SegmentSample,
    ) -> Result<ComparisonResult> {
        let comparison = format!("{} vs {}", left.short_name(), right.short_name());

        let visit_p_value = Self::chi_square_p_value(
            [
                [left_sample.visits, left_sample.total - left_sample.visits],
                [right_sample.visits, right_sample.total - right_sample.visits],
            ],
            "visit",
            &comparison,
        )?;

        let conversion_p_value = Self::chi_square_p_value(
            [
                [
                    left_sample.conversions,
                    left_sample.total - left_sample.conversions,
                ],
                [
                    right_sample.conversions,
                    right_sample.total - right_sample.conversions,
                ],
            ],
            "conversion",
            &comparison,
        )?;

        let spend = stats::students_t_test(&left_sample.spend, &right_sample.spend);

        Ok(ComparisonResult {
            left,
            right,
            visit_p_value,
            conversion_p_value,
            spend_p_value: spend.p_value,
        })
    }

    fn chi_square_p_value(table: [[u64; 2]; 2], metric: &str, comparison: &str) -> Result<f64> {
        match stats::chi_square_independence(table) {
            Some(outcome) => Ok(outcome.p_value),
            None => Err(InsightError::DegenerateTable {
                metric: metric.to_string(),
                comparison: comparison.to_string(),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

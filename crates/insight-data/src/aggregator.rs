//! Per-segment aggregation of the campaign dataset.
//!
//! Collapses raw [`CampaignRecord`]s into per-segment performance metrics
//! plus the dataset-wide headline numbers used by the executive summary.

use std::collections::BTreeMap;

use insight_core::models::{CampaignRecord, OverallSummary, Segment, SegmentMetrics};

// ── SegmentAccumulator ────────────────────────────────────────────────────────

/// Running totals for one campaign segment.
#[derive(Debug, Clone, Default)]
struct SegmentAccumulator {
    user_count: u64,
    visit_count: u64,
    conversion_count: u64,
    spend_sum: f64,
    spend_count: u64,
}

impl SegmentAccumulator {
    /// Add a single customer record to the running totals.
    fn add_record(&mut self, record: &CampaignRecord) {
        self.user_count += 1;
        if record.visited {
            self.visit_count += 1;
        }
        if record.converted {
            self.conversion_count += 1;
        }
        if let Some(spend) = record.spend {
            self.spend_sum += spend;
            self.spend_count += 1;
        }
    }

    fn avg_spend(&self) -> f64 {
        if self.spend_count == 0 {
            f64::NAN
        } else {
            self.spend_sum / self.spend_count as f64
        }
    }

    fn into_metrics(self, segment: Segment) -> SegmentMetrics {
        SegmentMetrics {
            segment,
            user_count: self.user_count,
            visit_rate: ratio(self.visit_count, self.user_count),
            conversion_count: self.conversion_count,
            conversion_rate: ratio(self.conversion_count, self.user_count),
            avg_spend: self.avg_spend(),
        }
    }
}

// ── SegmentAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups campaign records by segment.
pub struct SegmentAggregator;

impl SegmentAggregator {
    /// Aggregate `records` into one [`SegmentMetrics`] per segment present
    /// in the data.
    ///
    /// Returns segments sorted by label (ascending). Segments with no
    /// records are absent rather than zero-filled.
    pub fn aggregate(records: &[CampaignRecord]) -> Vec<SegmentMetrics> {
        // BTreeMap keeps segments in label order.
        let mut map: BTreeMap<Segment, SegmentAccumulator> = BTreeMap::new();

        for record in records {
            map.entry(record.segment).or_default().add_record(record);
        }

        map.into_iter()
            .map(|(segment, acc)| acc.into_metrics(segment))
            .collect()
    }

    /// Dataset-wide totals across all segments.
    ///
    /// Rates and the spend average are NaN when `records` is empty.
    pub fn overall_summary(records: &[CampaignRecord]) -> OverallSummary {
        let mut acc = SegmentAccumulator::default();
        for record in records {
            acc.add_record(record);
        }

        OverallSummary {
            total_users: acc.user_count,
            conversion_rate: ratio(acc.conversion_count, acc.user_count),
            avg_spend: acc.avg_spend(),
        }
    }

    /// The segment with the highest conversion rate.
    ///
    /// Ties go to the first segment in label order. `None` when `metrics`
    /// is empty.
    pub fn winner(metrics: &[SegmentMetrics]) -> Option<&SegmentMetrics> {
        let mut best: Option<&SegmentMetrics> = None;
        for candidate in metrics {
            match best {
                Some(current) if candidate.conversion_rate > current.conversion_rate => {
                    best = Some(candidate);
                }
                None => best = Some(candidate),
                _ => {}
            }
        }
        best
    }
}

/// Plain f64 division; 0/0 yields NaN for empty groups.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator as f64
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(
        segment: Segment,
        visited: bool,
        converted: bool,
        spend: Option<f64>,
    ) -> CampaignRecord {
        CampaignRecord {
            segment,
            visited,
            converted,
            spend,
            history_spend: Some(100.0),
            acquired_in_last_year: false,
            address_category: "Urban".to_string(),
            history_footwear: false,
            history_apparel: true,
        }
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_groups_by_segment() {
        let records = vec![
            make_record(Segment::Apparel, true, true, Some(10.0)),
            make_record(Segment::Apparel, false, false, None),
            make_record(Segment::Control, false, false, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].segment, Segment::Apparel);
        assert_eq!(metrics[0].user_count, 2);
        assert_eq!(metrics[1].segment, Segment::Control);
        assert_eq!(metrics[1].user_count, 1);
    }

    #[test]
    fn test_aggregate_rates_and_spend() {
        let records = vec![
            make_record(Segment::Footwear, true, true, Some(10.0)),
            make_record(Segment::Footwear, true, false, Some(20.0)),
            make_record(Segment::Footwear, false, false, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);

        assert_eq!(metrics.len(), 1);
        let footwear = &metrics[0];
        assert_eq!(footwear.user_count, 3);
        assert!((footwear.visit_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(footwear.conversion_count, 1);
        assert!((footwear.conversion_rate - 1.0 / 3.0).abs() < 1e-12);
        // Average over the two recorded spends only.
        assert!((footwear.avg_spend - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_counts_sum_to_total() {
        let records = vec![
            make_record(Segment::Apparel, true, false, None),
            make_record(Segment::Footwear, true, true, Some(5.0)),
            make_record(Segment::Footwear, false, false, None),
            make_record(Segment::Control, false, false, None),
            make_record(Segment::Control, true, false, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);

        let total: u64 = metrics.iter().map(|m| m.user_count).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn test_aggregate_rates_within_unit_interval() {
        let records = vec![
            make_record(Segment::Apparel, true, true, Some(1.0)),
            make_record(Segment::Apparel, false, false, None),
            make_record(Segment::Control, true, false, None),
        ];
        for metrics in SegmentAggregator::aggregate(&records) {
            assert!((0.0..=1.0).contains(&metrics.visit_rate));
            assert!((0.0..=1.0).contains(&metrics.conversion_rate));
        }
    }

    #[test]
    fn test_aggregate_sorted_by_label() {
        let records = vec![
            make_record(Segment::Control, false, false, None),
            make_record(Segment::Footwear, false, false, None),
            make_record(Segment::Apparel, false, false, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);

        let segments: Vec<Segment> = metrics.iter().map(|m| m.segment).collect();
        assert_eq!(
            segments,
            vec![Segment::Apparel, Segment::Footwear, Segment::Control]
        );
    }

    #[test]
    fn test_aggregate_empty() {
        let metrics = SegmentAggregator::aggregate(&[]);
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_aggregate_avg_spend_nan_when_all_missing() {
        let records = vec![make_record(Segment::Control, false, false, None)];
        let metrics = SegmentAggregator::aggregate(&records);
        assert!(metrics[0].avg_spend.is_nan());
    }

    // ── overall_summary ───────────────────────────────────────────────────────

    #[test]
    fn test_overall_summary_totals() {
        let records = vec![
            make_record(Segment::Apparel, true, true, Some(30.0)),
            make_record(Segment::Footwear, true, false, Some(10.0)),
            make_record(Segment::Control, false, false, None),
            make_record(Segment::Control, false, false, None),
        ];
        let overall = SegmentAggregator::overall_summary(&records);

        assert_eq!(overall.total_users, 4);
        assert!((overall.conversion_rate - 0.25).abs() < 1e-12);
        assert!((overall.avg_spend - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_summary_empty() {
        let overall = SegmentAggregator::overall_summary(&[]);
        assert_eq!(overall.total_users, 0);
        assert!(overall.conversion_rate.is_nan());
        assert!(overall.avg_spend.is_nan());
    }

    #[test]
    fn test_overall_summary_consistent_with_segments() {
        let records = vec![
            make_record(Segment::Apparel, true, true, Some(1.0)),
            make_record(Segment::Apparel, false, false, None),
            make_record(Segment::Footwear, true, true, Some(2.0)),
            make_record(Segment::Control, false, false, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);
        let overall = SegmentAggregator::overall_summary(&records);

        let conversions: u64 = metrics.iter().map(|m| m.conversion_count).sum();
        let users: u64 = metrics.iter().map(|m| m.user_count).sum();
        assert_eq!(overall.total_users, users);
        assert!((overall.conversion_rate - conversions as f64 / users as f64).abs() < 1e-12);
    }

    // ── winner ────────────────────────────────────────────────────────────────

    #[test]
    fn test_winner_highest_conversion_rate() {
        let mut records = vec![make_record(Segment::Apparel, true, true, Some(5.0))];
        for _ in 0..3 {
            records.push(make_record(Segment::Apparel, false, false, None));
        }
        records.push(make_record(Segment::Footwear, true, true, Some(5.0)));
        records.push(make_record(Segment::Footwear, true, true, Some(5.0)));
        records.push(make_record(Segment::Control, false, false, None));

        let metrics = SegmentAggregator::aggregate(&records);
        let winner = SegmentAggregator::winner(&metrics).unwrap();
        assert_eq!(winner.segment, Segment::Footwear);
    }

    #[test]
    fn test_winner_tie_goes_to_first() {
        let records = vec![
            make_record(Segment::Apparel, true, true, None),
            make_record(Segment::Footwear, true, true, None),
        ];
        let metrics = SegmentAggregator::aggregate(&records);
        // Both segments convert at 100%; the first in label order wins.
        let winner = SegmentAggregator::winner(&metrics).unwrap();
        assert_eq!(winner.segment, Segment::Apparel);
    }

    #[test]
    fn test_winner_empty_none() {
        assert!(SegmentAggregator::winner(&[]).is_none());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// The marketing treatment group a customer received.
///
/// The variant order matches the label sort order used for display, so a
/// `BTreeMap<Segment, _>` iterates segments the same way the report lists
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Customers who received the apparel e-mail campaign.
    #[serde(rename = "Apparel E-Mail")]
    Apparel,
    /// Customers who received the footwear e-mail campaign.
    #[serde(rename = "Footwear E-Mail")]
    Footwear,
    /// Control group: customers who received no e-mail.
    #[serde(rename = "No E-Mail")]
    Control,
}

impl Segment {
    /// Parse the dataset's segment label into a [`Segment`].
    ///
    /// Leading and trailing whitespace is ignored; anything other than the
    /// three known labels yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use insight_core::models::Segment;
    ///
    /// assert_eq!(Segment::from_label("Apparel E-Mail"), Some(Segment::Apparel));
    /// assert_eq!(Segment::from_label(" No E-Mail "), Some(Segment::Control));
    /// assert_eq!(Segment::from_label("Sportswear E-Mail"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Apparel E-Mail" => Some(Self::Apparel),
            "Footwear E-Mail" => Some(Self::Footwear),
            "No E-Mail" => Some(Self::Control),
            _ => None,
        }
    }

    /// The label used in the dataset and in report tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Apparel => "Apparel E-Mail",
            Self::Footwear => "Footwear E-Mail",
            Self::Control => "No E-Mail",
        }
    }

    /// Short name used when naming pairwise comparisons.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Apparel => "Apparel",
            Self::Footwear => "Footwear",
            Self::Control => "No Email",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One customer row of the campaign dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Treatment group this customer was assigned to.
    pub segment: Segment,
    /// Whether the customer visited the website after the campaign.
    pub visited: bool,
    /// Whether the customer made a purchase attributed to the campaign.
    pub converted: bool,
    /// Dollars spent during the campaign window; `None` when the cell is
    /// missing from the dataset.
    pub spend: Option<f64>,
    /// Dollars spent in the year before the campaign; `None` when missing.
    pub history_spend: Option<f64>,
    /// 1 = acquired in the last year (new customer), 0 = existing customer.
    pub acquired_in_last_year: bool,
    /// Address category, e.g. "Urban", "Suburban" or "Rural".
    pub address_category: String,
    /// Whether the customer bought footwear before the campaign.
    pub history_footwear: bool,
    /// Whether the customer bought apparel before the campaign.
    pub history_apparel: bool,
}

/// Aggregated performance metrics for one campaign segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMetrics {
    /// The segment these metrics describe.
    pub segment: Segment,
    /// Number of customers in the segment.
    pub user_count: u64,
    /// Fraction of customers who visited the website.
    pub visit_rate: f64,
    /// Number of customers who converted.
    pub conversion_count: u64,
    /// Fraction of customers who converted.
    pub conversion_rate: f64,
    /// Mean spend over customers with a recorded spend value; NaN when the
    /// segment has no spend values at all.
    pub avg_spend: f64,
}

/// Dataset-wide headline numbers for the executive summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummary {
    /// Total number of customers targeted across all segments.
    pub total_users: u64,
    /// Conversion rate over the whole dataset.
    pub conversion_rate: f64,
    /// Mean spend over the whole dataset (missing values skipped).
    pub avg_spend: f64,
}

/// Significance-test p-values for one unordered pair of segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// First segment of the pair.
    pub left: Segment,
    /// Second segment of the pair.
    pub right: Segment,
    /// Chi-square p-value for the visit contingency table.
    pub visit_p_value: f64,
    /// Chi-square p-value for the conversion contingency table.
    pub conversion_p_value: f64,
    /// Two-sample t-test p-value for the spend difference. NaN when the
    /// test is undefined (fewer than two spend values on a side).
    pub spend_p_value: f64,
}

impl ComparisonResult {
    /// Human-readable comparison label, e.g. `"Apparel vs Footwear"`.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.left.short_name(), self.right.short_name())
    }
}

/// Customer-value tier derived from terciles of historical spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpendTier {
    /// Bottom tercile of historical spend.
    #[serde(rename = "Low Value")]
    Low,
    /// Middle tercile of historical spend.
    #[serde(rename = "Medium Value")]
    Medium,
    /// Top tercile of historical spend.
    #[serde(rename = "High Value")]
    High,
}

impl SpendTier {
    /// The label used in report tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Value",
            Self::Medium => "Medium Value",
            Self::High => "High Value",
        }
    }
}

impl fmt::Display for SpendTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

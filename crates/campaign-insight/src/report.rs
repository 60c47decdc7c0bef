//! Rendering of a finished analysis as plain text or JSON.
//!
//! The text renderer sizes every column to its widest cell (display width,
//! not byte length) so that labels such as "Apparel E-Mail" stay lined up
//! with the numbers underneath them.

use insight_core::formatting::{
    format_count, format_currency, format_number, format_p_value, format_percent,
};
use insight_core::models::{ComparisonResult, SegmentMetrics};
use insight_data::analysis::{AnalysisMetadata, AnalysisResult};
use insight_data::overview::DatasetOverview;
use insight_data::profiling::{SegmentBreakdown, SpendProfile};
use insight_data::reader::REQUIRED_COLUMNS;
use unicode_width::UnicodeWidthStr;

/// Comparisons below this p-value get a marker in the significance table.
const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

// ── Public API ─────────────────────────────────────────────────────────────────

/// Render the full plain-text report.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&section("Campaign Insight Report"));
    out.push('\n');
    out.push_str(&executive_summary(result));
    out.push('\n');
    out.push_str(&performance_section(&result.metrics));
    out.push('\n');
    out.push_str(&significance_section(&result.comparisons));
    out.push('\n');
    out.push_str(&overview_section(&result.overview));
    out.push('\n');
    out.push_str(&breakdown_section(&result.breakdowns));
    out.push('\n');
    out.push_str(&tier_section(result.spend_profile.as_ref()));
    out.push('\n');
    out.push_str(&run_details(&result.metadata));
    out
}

/// Render the analysis as pretty-printed JSON.
///
/// Non-finite numbers (empty-group rates, unavailable p-values) serialize
/// as `null`.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

// ── Sections ───────────────────────────────────────────────────────────────────

fn executive_summary(result: &AnalysisResult) -> String {
    let overall = &result.overall;
    let mut out = section("Executive Summary");
    out.push_str(&key_value_lines(&[
        ("Total Users", format_count(overall.total_users)),
        ("Overall Conversion", format_percent(overall.conversion_rate)),
        ("Average Spend", format_currency(overall.avg_spend)),
    ]));
    out.push('\n');
    match &result.winner {
        Some(winner) => out.push_str(&format!(
            "Winning Segment: {} ({} conversion)\n",
            winner.segment.label(),
            format_percent(winner.conversion_rate)
        )),
        None => out.push_str("Winning Segment: none (no records loaded)\n"),
    }
    out
}

fn performance_section(metrics: &[SegmentMetrics]) -> String {
    let mut out = section("Campaign Performance");
    if metrics.is_empty() {
        out.push_str("No segments present in the dataset.\n");
        return out;
    }
    let rows: Vec<Vec<String>> = metrics
        .iter()
        .map(|m| {
            vec![
                m.segment.label().to_string(),
                format_count(m.user_count),
                format_percent(m.visit_rate),
                format_count(m.conversion_count),
                format_percent(m.conversion_rate),
                format_currency(m.avg_spend),
            ]
        })
        .collect();
    out.push_str(&aligned_table(
        &[
            "Segment",
            "Users",
            "Visit Rate",
            "Conversions",
            "Conversion Rate",
            "Avg Spend",
        ],
        &[
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
        &rows,
    ));
    out
}

fn significance_section(comparisons: &[ComparisonResult]) -> String {
    let mut out = section("Statistical Significance");
    if comparisons.is_empty() {
        out.push_str("Fewer than two segments present; nothing to compare.\n");
        return out;
    }
    let rows: Vec<Vec<String>> = comparisons
        .iter()
        .map(|c| {
            vec![
                c.label(),
                p_cell(c.visit_p_value),
                p_cell(c.conversion_p_value),
                p_cell(c.spend_p_value),
            ]
        })
        .collect();
    out.push_str(&aligned_table(
        &["Comparison", "Visit p", "Conversion p", "Spend p"],
        &[Align::Left, Align::Right, Align::Right, Align::Right],
        &rows,
    ));
    out.push_str(&format!("* significant at p < {SIGNIFICANCE_THRESHOLD}\n"));
    out
}

fn overview_section(overview: &DatasetOverview) -> String {
    let mut out = section("Dataset Overview");
    out.push_str(&format!(
        "Shape: {} rows x {} columns\n\n",
        format_count(overview.row_count),
        overview.column_count
    ));

    let describe_rows: Vec<Vec<String>> = overview
        .summaries
        .iter()
        .map(|s| {
            vec![
                s.column.clone(),
                format_count(s.count),
                stat_cell(s.mean),
                stat_cell(s.std_dev),
                stat_cell(s.min),
                stat_cell(s.q25),
                stat_cell(s.median),
                stat_cell(s.q75),
                stat_cell(s.max),
            ]
        })
        .collect();
    out.push_str(&aligned_table(
        &[
            "Column", "Count", "Mean", "Std Dev", "Min", "25%", "50%", "75%", "Max",
        ],
        &[
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
        &describe_rows,
    ));
    out.push('\n');

    out.push_str("Missing Values\n");
    let missing_rows: Vec<Vec<String>> = overview
        .missing_counts
        .iter()
        .map(|m| vec![m.column.clone(), format_count(m.missing)])
        .collect();
    out.push_str(&aligned_table(
        &["Column", "Missing"],
        &[Align::Left, Align::Right],
        &missing_rows,
    ));
    out.push('\n');

    out.push_str(&format!("Sample (first {} rows)\n", overview.sample.len()));
    if overview.sample.is_empty() {
        out.push_str("No rows to show.\n");
        return out;
    }
    let sample_rows: Vec<Vec<String>> = overview
        .sample
        .iter()
        .map(|r| {
            vec![
                r.segment.label().to_string(),
                flag(r.visited).to_string(),
                flag(r.converted).to_string(),
                spend_cell(r.spend),
                spend_cell(r.history_spend),
                flag(r.acquired_in_last_year).to_string(),
                r.address_category.clone(),
                flag(r.history_footwear).to_string(),
                flag(r.history_apparel).to_string(),
            ]
        })
        .collect();
    out.push_str(&aligned_table(
        &REQUIRED_COLUMNS,
        &[
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Left,
            Align::Right,
            Align::Right,
        ],
        &sample_rows,
    ));
    out
}

fn breakdown_section(breakdowns: &[SegmentBreakdown]) -> String {
    let mut out = section("Segmentation Deep Dive");
    for (index, breakdown) in breakdowns.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!("By {}\n", breakdown.attribute));
        let rows: Vec<Vec<String>> = breakdown
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.segment.label().to_string(),
                    row.value.clone(),
                    format_count(row.user_count),
                    format_percent(row.conversion_rate),
                    format_currency(row.avg_spend),
                ]
            })
            .collect();
        out.push_str(&aligned_table(
            &["Segment", "Value", "Users", "Conversion Rate", "Avg Spend"],
            &[
                Align::Left,
                Align::Left,
                Align::Right,
                Align::Right,
                Align::Right,
            ],
            &rows,
        ));
    }
    out
}

fn tier_section(profile: Option<&SpendProfile>) -> String {
    let mut out = section("Customer Value Tiers");
    let Some(profile) = profile else {
        out.push_str("Spend tiers are unavailable for this dataset.\n");
        return out;
    };
    let boundaries: Vec<String> = profile
        .boundaries
        .iter()
        .map(|b| format_currency(*b))
        .collect();
    out.push_str(&format!(
        "History spend boundaries: {}\n\n",
        boundaries.join(", ")
    ));
    let rows: Vec<Vec<String>> = profile
        .rows
        .iter()
        .map(|row| {
            vec![
                row.segment.label().to_string(),
                row.tier.label().to_string(),
                format_count(row.user_count),
                format_percent(row.conversion_rate),
            ]
        })
        .collect();
    out.push_str(&aligned_table(
        &["Segment", "Tier", "Users", "Conversion Rate"],
        &[Align::Left, Align::Left, Align::Right, Align::Right],
        &rows,
    ));
    out
}

fn run_details(metadata: &AnalysisMetadata) -> String {
    let mut out = section("Run Details");
    out.push_str(&key_value_lines(&[
        ("Generated", metadata.generated_at.clone()),
        ("Data file", metadata.data_path.clone()),
        ("Records loaded", format_count(metadata.records_loaded as u64)),
        ("Load time", format!("{:.2}s", metadata.load_time_seconds)),
        ("Compute time", format!("{:.2}s", metadata.compute_time_seconds)),
    ]));
    out
}

// ── Cell formatting ────────────────────────────────────────────────────────────

/// A p-value cell, marked with `*` when it clears the significance threshold.
fn p_cell(p: f64) -> String {
    let formatted = format_p_value(p);
    if p.is_finite() && p < SIGNIFICANCE_THRESHOLD {
        format!("{formatted} *")
    } else {
        formatted
    }
}

/// A descriptive-statistics cell; non-finite values render as "n/a".
fn stat_cell(value: f64) -> String {
    if value.is_finite() {
        format_number(value, 2)
    } else {
        "n/a".to_string()
    }
}

/// A raw spend cell from the sample table.
fn spend_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format_number(v, 2),
        _ => "n/a".to_string(),
    }
}

/// Flags render the way they appear in the dataset.
fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

// ── Table layout ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

fn section(title: &str) -> String {
    format!("=== {title} ===\n")
}

/// Label-value pairs with the values aligned past the widest label.
fn key_value_lines(pairs: &[(&str, String)]) -> String {
    let label_width = pairs
        .iter()
        .map(|(label, _)| label.width())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (label, value) in pairs {
        let pad = label_width.saturating_sub(label.width());
        out.push_str(label);
        out.push_str(&" ".repeat(pad));
        out.push_str("  ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// A header row, a dashed rule and the data rows, with each column padded to
/// its widest cell.
fn aligned_table(headers: &[&str], aligns: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.width());
            }
        }
    }
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

    let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    let mut out = table_row(&header_cells, aligns, &widths);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in rows {
        out.push_str(&table_row(row, aligns, &widths));
    }
    out
}

fn table_row(cells: &[String], aligns: &[Align], widths: &[usize]) -> String {
    let mut line = String::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        let pad = widths[index].saturating_sub(cell.width());
        match aligns[index] {
            Align::Left => {
                line.push_str(cell);
                line.push_str(&" ".repeat(pad));
            }
            Align::Right => {
                line.push_str(&" ".repeat(pad));
                line.push_str(cell);
            }
        }
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

// ── Tests ──────────────────────────────────────────────────────────────────────

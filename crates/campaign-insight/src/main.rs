//! Campaign Insight CLI entry point.
//!
//! Loads the campaign dataset, computes segment performance and significance
//! tests, and prints the report in the requested format.

mod bootstrap;
mod report;

use anyhow::{Context, Result};
use insight_core::settings::Settings;
use insight_data::analysis::analyze_campaign;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Campaign Insight v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Format: {}, Breakdown: {}",
        settings.data.display(),
        settings.format,
        settings.breakdown
    );

    let result = analyze_campaign(
        &settings.data,
        &settings.breakdown,
        settings.sample_rows as usize,
    )
    .with_context(|| format!("Failed to analyse {}", settings.data.display()))?;

    match settings.format.as_str() {
        "json" => println!("{}", report::render_json(&result)?),
        _ => print!("{}", report::render_report(&result)),
    }

    Ok(())
}

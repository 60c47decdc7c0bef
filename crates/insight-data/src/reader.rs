//! CSV loading for Campaign Insight.
//!
//! Reads the campaign dataset into [`CampaignRecord`] structs. The header is
//! validated against the fixed set of expected columns before any row is
//! parsed, so a truncated or renamed column fails loudly instead of skewing
//! the aggregation downstream.

use std::path::Path;

use insight_core::error::{InsightError, Result};
use insight_core::models::{CampaignRecord, Segment};
use serde::Deserialize;
use tracing::debug;

/// Columns the dataset must provide, in any order. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "campaign_segment",
    "visit",
    "conversion",
    "spend",
    "history_spend",
    "acquired_in_last_year",
    "address_category",
    "history_footwear",
    "history_apparel",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the campaign dataset from `path`.
///
/// Fails with [`InsightError::FileRead`] when the file cannot be opened,
/// [`InsightError::MissingColumn`] when a required column is absent from the
/// header, and [`InsightError::Row`] (tagged with the 1-based line number)
/// when a cell cannot be parsed. An empty dataset is not an error; it loads
/// as an empty vector.
pub fn load_records(path: &Path) -> Result<Vec<CampaignRecord>> {
    let file = std::fs::File::open(path).map_err(|source| InsightError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    validate_header(&mut reader, path)?;

    let mut records: Vec<CampaignRecord> = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // The header occupies line 1, so the first data row is line 2.
        let line = index as u64 + 2;
        let row = row.map_err(|e| InsightError::Row {
            line,
            message: e.to_string(),
        })?;
        let record = row.into_record().map_err(|e| InsightError::Row {
            line,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    debug!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Raw CSV row exactly as it appears in the file. Converted to the typed
/// [`CampaignRecord`] after deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    campaign_segment: String,
    visit: u8,
    conversion: u8,
    spend: Option<f64>,
    history_spend: Option<f64>,
    acquired_in_last_year: u8,
    address_category: String,
    history_footwear: u8,
    history_apparel: u8,
}

impl CsvRow {
    fn into_record(self) -> Result<CampaignRecord> {
        let segment = Segment::from_label(&self.campaign_segment).ok_or_else(|| {
            InsightError::UnknownSegment(self.campaign_segment.trim().to_string())
        })?;

        Ok(CampaignRecord {
            segment,
            visited: self.visit != 0,
            converted: self.conversion != 0,
            spend: self.spend,
            history_spend: self.history_spend,
            acquired_in_last_year: self.acquired_in_last_year != 0,
            address_category: self.address_category,
            history_footwear: self.history_footwear != 0,
            history_apparel: self.history_apparel != 0,
        })
    }
}

/// Check that every required column is present in the header.
fn validate_header<R: std::io::Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<()> {
    let headers = reader.headers().map_err(|e| InsightError::Row {
        line: 1,
        message: e.to_string(),
    })?;

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(InsightError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HEADER: &str = "campaign_segment,visit,conversion,spend,history_spend,\
                          acquired_in_last_year,address_category,history_footwear,history_apparel";

    fn write_csv(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", header).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    fn sample_row(segment: &str, visit: u8, conversion: u8, spend: &str) -> String {
        format!("{segment},{visit},{conversion},{spend},142.44,1,Urban,0,1")
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_records_basic() {
        let dir = TempDir::new().unwrap();
        let rows = [
            sample_row("Apparel E-Mail", 1, 1, "29.99"),
            sample_row("Footwear E-Mail", 1, 0, "0.0"),
            sample_row("No E-Mail", 0, 0, "0.0"),
        ];
        let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &refs);

        let records = load_records(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].segment, Segment::Apparel);
        assert!(records[0].visited);
        assert!(records[0].converted);
        assert_eq!(records[0].spend, Some(29.99));
        assert_eq!(records[0].history_spend, Some(142.44));
        assert!(records[0].acquired_in_last_year);
        assert_eq!(records[0].address_category, "Urban");
        assert!(!records[0].history_footwear);
        assert!(records[0].history_apparel);
        assert_eq!(records[2].segment, Segment::Control);
        assert!(!records[2].visited);
    }

    #[test]
    fn test_load_records_missing_file() {
        let err = load_records(Path::new("/tmp/does-not-exist-insight-test.csv")).unwrap_err();
        assert!(matches!(err, InsightError::FileRead { .. }));
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_load_records_missing_column_fails_loudly() {
        let dir = TempDir::new().unwrap();
        // Header without the 'conversion' column.
        let header = "campaign_segment,visit,spend,history_spend,\
                      acquired_in_last_year,address_category,history_footwear,history_apparel";
        let path = write_csv(dir.path(), "campaign.csv", header, &[]);

        let err = load_records(&path).unwrap_err();
        match err {
            InsightError::MissingColumn { column, .. } => assert_eq!(column, "conversion"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_records_unknown_segment_reports_line() {
        let dir = TempDir::new().unwrap();
        let rows = [
            sample_row("Apparel E-Mail", 1, 0, "10.0"),
            sample_row("Sportswear E-Mail", 1, 0, "10.0"),
        ];
        let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &refs);

        let err = load_records(&path).unwrap_err();
        match err {
            InsightError::Row { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("Sportswear E-Mail"), "message = {message}");
            }
            other => panic!("expected Row, got {other:?}"),
        }
    }

    #[test]
    fn test_load_records_malformed_cell_reports_line() {
        let dir = TempDir::new().unwrap();
        let good = sample_row("Apparel E-Mail", 1, 0, "10.0");
        let bad = sample_row("Apparel E-Mail", 1, 0, "ten dollars");
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &[&good, &bad]);

        let err = load_records(&path).unwrap_err();
        match err {
            InsightError::Row { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Row, got {other:?}"),
        }
    }

    #[test]
    fn test_load_records_empty_spend_is_missing() {
        let dir = TempDir::new().unwrap();
        let row = sample_row("No E-Mail", 0, 0, "");
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &[&row]);

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].spend, None);
    }

    #[test]
    fn test_load_records_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let row = "  Apparel E-Mail , 1 , 1 , 12.5 , 99.0 , 0 , Rural , 1 , 0";
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &[row]);

        let records = load_records(&path).unwrap();
        assert_eq!(records[0].segment, Segment::Apparel);
        assert_eq!(records[0].address_category, "Rural");
        assert!(records[0].history_footwear);
    }

    #[test]
    fn test_load_records_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "campaign.csv", HEADER, &[]);

        let records = load_records(&path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_records_extra_columns_ignored() {
        let dir = TempDir::new().unwrap();
        let header = format!("{HEADER},loyalty_tier");
        let row = format!("{},gold", sample_row("No E-Mail", 0, 0, "0.0"));
        let path = write_csv(dir.path(), "campaign.csv", &header, &[&row]);

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].segment, Segment::Control);
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Campaign Insight crates.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV header is missing a required column.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A CSV row could not be parsed into a campaign record.
    #[error("Row {line}: {message}")]
    Row { line: u64, message: String },

    /// A segment label did not match any known campaign segment.
    #[error("Unknown campaign segment: {0}")]
    UnknownSegment(String),

    /// A chi-square test received a table with a zero expected frequency.
    #[error("Chi-square test undefined for '{metric}' ({comparison}): zero expected frequency")]
    DegenerateTable { metric: String, comparison: String },

    /// Quantile bin edges collapsed, so tier assignment is undefined.
    #[error("Spend tiers undefined: {0}")]
    DegenerateBins(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insight crates.
pub type Result<T> = std::result::Result<T, InsightError>;

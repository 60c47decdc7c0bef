use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Marketing campaign performance analytics from the command line
#[derive(Parser, Debug, Clone)]
#[command(
    name = "campaign-insight",
    about = "Marketing campaign performance analytics from the command line",
    version
)]
pub struct Settings {
    /// Path to the campaign dataset (CSV)
    #[arg(long, default_value = "digital_marketing_dataset.csv")]
    pub data: PathBuf,

    /// Report output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Demographic attribute for the segmentation deep dive
    #[arg(long, default_value = "all", value_parser = [
        "acquired_in_last_year",
        "address_category",
        "history_footwear",
        "history_apparel",
        "all",
    ])]
    pub breakdown: String,

    /// Number of sample rows shown in the dataset overview (1-100)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub sample_rows: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.campaign-insight/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rows: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.campaign-insight/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".campaign-insight").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_with_last_used_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::load_with_last_used_impl(args, &LastUsedParams::config_path())
    }

    /// Full implementation, accepting args and an explicit config path so
    /// that tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            // Return without re-persisting.
            return Self::resolve_log_level(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on the
        // command line (CLI always wins). Logging flags are never persisted.
        // NOTE: clap stores the arg id using the *field name* (underscores),
        // not the long-flag spelling (hyphens).
        if !is_arg_explicitly_set(&matches, "data") {
            if let Some(v) = last.data {
                settings.data = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "breakdown") {
            if let Some(v) = last.breakdown {
                settings.breakdown = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "sample_rows") {
            if let Some(v) = last.sample_rows {
                settings.sample_rows = v;
            }
        }

        settings = Self::resolve_log_level(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Apply the `--debug` flag to the effective log level.
    fn resolve_log_level(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data: Some(s.data.clone()),
            format: Some(s.format.clone()),
            breakdown: Some(s.breakdown.clone()),
            sample_rows: Some(s.sample_rows),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build the config path inside `tmp`.
    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    /// Save `params` to `tmp`, then load them back.
    fn round_trip(tmp: &TempDir, params: &LastUsedParams) -> LastUsedParams {
        let path = tmp_config_path(tmp);
        params.save_to(&path).expect("save");
        LastUsedParams::load_from(&path)
    }

    // ── test_last_used_params_save_load ───────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let params = LastUsedParams {
            data: Some(PathBuf::from("/data/campaign.csv")),
            format: Some("json".to_string()),
            breakdown: Some("address_category".to_string()),
            sample_rows: Some(25),
        };

        let loaded = round_trip(&tmp, &params);

        assert_eq!(loaded.data, Some(PathBuf::from("/data/campaign.csv")));
        assert_eq!(loaded.format, Some("json".to_string()));
        assert_eq!(loaded.breakdown, Some("address_category".to_string()));
        assert_eq!(loaded.sample_rows, Some(25));
    }

    // ── test_last_used_params_clear ───────────────────────────────────────────

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        // Save something first.
        let params = LastUsedParams {
            format: Some("json".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        // Clear it.
        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    // ── test_last_used_params_default_when_missing ────────────────────────────

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        // No file created, so load should return default.
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.data.is_none());
        assert!(loaded.format.is_none());
        assert!(loaded.breakdown.is_none());
        assert!(loaded.sample_rows.is_none());
    }

    // ── test_settings_default_values ─────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        // Parse with only the binary name (no flags) to get all defaults.
        let settings = Settings::parse_from(["campaign-insight"]);

        assert_eq!(settings.data, PathBuf::from("digital_marketing_dataset.csv"));
        assert_eq!(settings.format, "table");
        assert_eq!(settings.breakdown, "all");
        assert_eq!(settings.sample_rows, 10);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    // ── test_from_settings_to_last_used ──────────────────────────────────────

    #[test]
    fn test_from_settings_to_last_used() {
        let settings = Settings {
            data: PathBuf::from("spring_campaign.csv"),
            format: "json".to_string(),
            breakdown: "history_apparel".to_string(),
            sample_rows: 5,
            log_level: "INFO".to_string(),
            log_file: None,
            debug: false,
            clear: false,
        };

        let last = LastUsedParams::from(&settings);

        assert_eq!(last.data, Some(PathBuf::from("spring_campaign.csv")));
        assert_eq!(last.format, Some("json".to_string()));
        assert_eq!(last.breakdown, Some("history_apparel".to_string()));
        assert_eq!(last.sample_rows, Some(5));
        // Logging flags are NOT stored in LastUsedParams.
    }

    // ── test_settings_cli_parsing ─────────────────────────────────────────────

    #[test]
    fn test_settings_cli_explicit_format() {
        let settings = Settings::parse_from(["campaign-insight", "--format", "json"]);
        assert_eq!(settings.format, "json");
    }

    #[test]
    fn test_settings_cli_debug_flag() {
        let settings = Settings::parse_from(["campaign-insight", "--debug"]);
        assert!(settings.debug);
    }

    #[test]
    fn test_settings_cli_breakdown() {
        let settings =
            Settings::parse_from(["campaign-insight", "--breakdown", "history_footwear"]);
        assert_eq!(settings.breakdown, "history_footwear");
    }

    #[test]
    fn test_settings_cli_log_file() {
        let settings = Settings::parse_from(["campaign-insight", "--log-file", "/tmp/insight.log"]);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/insight.log")));
    }

    // ── test_load_with_last_used (uses config path injection) ─────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_data_path() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        // Pre-populate last-used with a data path.
        let params = LastUsedParams {
            data: Some(PathBuf::from("autumn_campaign.csv")),
            format: Some("table".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        // Parse without --data flag, so the persisted value applies.
        let settings =
            Settings::load_with_last_used_impl(vec!["campaign-insight".into()], &config_path);
        assert_eq!(settings.data, PathBuf::from("autumn_campaign.csv"));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        // Pre-populate last-used with json output.
        let params = LastUsedParams {
            format: Some("json".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        // Explicit --format table on CLI must win.
        let settings = Settings::load_with_last_used_impl(
            vec!["campaign-insight".into(), "--format".into(), "table".into()],
            &config_path,
        );
        assert_eq!(settings.format, "table");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            breakdown: Some("address_category".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");
        assert!(config_path.exists(), "file must exist before clear");

        Settings::load_with_last_used_impl(
            vec!["campaign-insight".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["campaign-insight".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["campaign-insight".into(), "--sample-rows".into(), "20".into()],
            &config_path,
        );

        // After a run the file should have been created.
        assert!(
            config_path.exists(),
            "config file must be persisted after run"
        );
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.sample_rows, Some(20));
    }
}

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{InsightsError, Result};

/// Default location of the portal alert export.
pub const DEFAULT_ALERTS_PATH: &str = "data/Portal-Alerts_all/Azure-Monitor-Alerts.csv";

/// File stem shared by the numbered application telemetry exports.
pub const DEFAULT_TELEMETRY_STEM: &str = "Azurecomponents";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Dashboard insights from Azure Monitor alert exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "alert-insights",
    about = "Dashboard insights from Azure Monitor alert exports",
    version
)]
pub struct Settings {
    /// Alert export: a CSV file, or a directory whose CSV files are concatenated
    #[arg(long, env = "ALERT_INSIGHTS_ALERTS", default_value = DEFAULT_ALERTS_PATH)]
    pub alerts: PathBuf,

    /// Directory holding application telemetry exports
    #[arg(long, env = "ALERT_INSIGHTS_TELEMETRY_DIR")]
    pub telemetry_dir: Option<PathBuf>,

    /// File stem of the numbered telemetry exports
    #[arg(long, default_value = DEFAULT_TELEMETRY_STEM)]
    pub telemetry_stem: String,

    /// Number of numbered telemetry parts to look for (1-64)
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=64))]
    pub telemetry_parts: u32,

    /// Output format
    #[arg(long, default_value = "json", value_parser = ["json", "text"])]
    pub format: String,

    /// Seconds to wait for the source files before giving up (1-600)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=600))]
    pub fetch_timeout: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply overrides.
    ///
    /// Exits the process on `--help`, `--version` or invalid arguments.
    pub fn load() -> Self {
        Settings::parse().resolve()
    }

    /// Same as [`Settings::load`] with an explicit argument list, returning
    /// parse failures instead of exiting.
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let settings = Settings::try_parse_from(args)
            .map_err(|e| InsightsError::Config(e.to_string()))?;
        Ok(settings.resolve())
    }

    /// Apply the `--debug` override and normalise the telemetry stem.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        let stem = self.telemetry_stem.trim().to_string();
        if stem.is_empty() {
            tracing::debug!("empty telemetry stem; using {}", DEFAULT_TELEMETRY_STEM);
            self.telemetry_stem = DEFAULT_TELEMETRY_STEM.to_string();
        } else {
            self.telemetry_stem = stem;
        }
        self
    }

    /// Deadline applied to each source read.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    /// `true` when the text digest was requested instead of JSON.
    pub fn wants_text(&self) -> bool {
        self.format == "text"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Settings::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(["alert-insights"]).expect("parse");
        assert_eq!(settings.alerts, PathBuf::from(DEFAULT_ALERTS_PATH));
        assert!(settings.telemetry_dir.is_none());
        assert_eq!(settings.telemetry_stem, "Azurecomponents");
        assert_eq!(settings.telemetry_parts, 7);
        assert_eq!(settings.format, "json");
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.wants_text());
    }

    #[test]
    fn test_explicit_values() {
        let settings = Settings::load_from([
            "alert-insights",
            "--alerts",
            "/tmp/alerts",
            "--telemetry-dir",
            "/tmp/telemetry",
            "--telemetry-parts",
            "3",
            "--format",
            "text",
            "--fetch-timeout",
            "5",
        ])
        .expect("parse");

        assert_eq!(settings.alerts, PathBuf::from("/tmp/alerts"));
        assert_eq!(settings.telemetry_dir, Some(PathBuf::from("/tmp/telemetry")));
        assert_eq!(settings.telemetry_parts, 3);
        assert!(settings.wants_text());
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings =
            Settings::load_from(["alert-insights", "--log-level", "ERROR", "--debug"]).expect("parse");
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_blank_stem_falls_back_to_default() {
        let settings =
            Settings::load_from(["alert-insights", "--telemetry-stem", "  "]).expect("parse");
        assert_eq!(settings.telemetry_stem, DEFAULT_TELEMETRY_STEM);

        let settings =
            Settings::load_from(["alert-insights", "--telemetry-stem", " Components "]).expect("parse");
        assert_eq!(settings.telemetry_stem, "Components");
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = Settings::load_from(["alert-insights", "--fetch-timeout", "0"]).unwrap_err();
        assert!(matches!(err, InsightsError::Config(_)));

        let err = Settings::load_from(["alert-insights", "--telemetry-parts", "65"]).unwrap_err();
        assert!(matches!(err, InsightsError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = Settings::load_from(["alert-insights", "--format", "yaml"]).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}

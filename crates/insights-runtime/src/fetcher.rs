//! Async retrieval of the source exports followed by the synchronous analysis.
//!
//! [`DashboardFetcher::fetch`] is the only suspension point of a dashboard
//! request: it awaits the file reads under a deadline, then hands the loaded
//! bytes to [`analyze_sources`]. Each call builds its own accumulators, so
//! concurrent fetches never share state.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use insights_core::error::{InsightsError, Result};
use insights_core::settings::Settings;
use insights_data::analysis::{analyze_sources, AnalysisResult, SourceFile};
use insights_data::reader::{find_csv_files, parse_csv, CsvRow};
use insights_data::telemetry::TelemetrySource;

/// Deadline used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ── DashboardFetcher ──────────────────────────────────────────────────────────

/// One configured dashboard data source.
///
/// # Example
/// ```no_run
/// use insights_runtime::fetcher::DashboardFetcher;
///
/// # async fn run() -> insights_core::Result<()> {
/// let result = DashboardFetcher::new("alerts.csv").fetch().await?;
/// println!("{} alerts", result.summary.total_alerts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DashboardFetcher {
    /// Alert export file, or a directory of exports.
    alerts: PathBuf,
    /// Optional application telemetry export set.
    telemetry: Option<TelemetrySource>,
    /// Deadline for reading the alert sources.
    timeout: Duration,
}

impl DashboardFetcher {
    pub fn new(alerts: impl Into<PathBuf>) -> Self {
        Self {
            alerts: alerts.into(),
            telemetry: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Build a fetcher from the command-line settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let fetcher = Self::new(&settings.alerts).with_timeout(settings.fetch_timeout());
        match &settings.telemetry_dir {
            Some(dir) => fetcher.with_telemetry(TelemetrySource::new(
                dir,
                settings.telemetry_stem.clone(),
                settings.telemetry_parts,
            )),
            None => fetcher,
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySource) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn alerts(&self) -> &Path {
        &self.alerts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Read every source and run the analysis.
    ///
    /// Fails when the alert source is missing, unreadable or not read within
    /// the deadline. Telemetry problems only produce warnings.
    pub async fn fetch(&self) -> Result<AnalysisResult> {
        tracing::debug!(
            alerts = %self.alerts.display(),
            timeout_secs = self.timeout.as_secs(),
            "fetching dashboard sources"
        );
        let load_start = Instant::now();

        let sources =
            with_deadline(&self.alerts, self.timeout, read_alert_sources(&self.alerts)).await?;

        let telemetry_rows = match &self.telemetry {
            Some(source) => {
                match with_deadline(&source.dir, self.timeout, read_telemetry_rows(source)).await {
                    Ok(rows) => Some(rows),
                    Err(e) => {
                        tracing::warn!(error = %e, "telemetry unavailable; continuing without it");
                        None
                    }
                }
            }
            None => None,
        };

        let load_time = load_start.elapsed().as_secs_f64();
        tracing::debug!(files = sources.len(), load_time, "sources loaded");

        Ok(analyze_sources(&sources, telemetry_rows.as_deref(), load_time))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Await `fut`, turning an elapsed deadline into [`InsightsError::FetchTimeout`].
async fn with_deadline<T>(
    path: &Path,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(InsightsError::FetchTimeout {
            path: path.to_path_buf(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Read the alert export, expanding a directory to its CSV files.
async fn read_alert_sources(source: &Path) -> Result<Vec<SourceFile>> {
    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|e| map_read_error(source, e))?;

    let paths = if metadata.is_dir() {
        let dir = source.to_path_buf();
        tokio::task::spawn_blocking(move || find_csv_files(&dir))
            .await
            .map_err(|e| InsightsError::Io(std::io::Error::other(e)))?
    } else {
        vec![source.to_path_buf()]
    };

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let data = read_source(&path).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "read alert export");
        sources.push(SourceFile { path, data });
    }
    Ok(sources)
}

/// Read every present telemetry part. Missing parts are skipped, unreadable
/// ones are logged and skipped.
async fn read_telemetry_rows(source: &TelemetrySource) -> Result<Vec<CsvRow>> {
    let mut rows = Vec::new();
    for path in source.part_paths() {
        match read_source(&path).await {
            Ok(data) => rows.extend(parse_csv(&data)),
            Err(InsightsError::SourceNotFound(_)) => {
                tracing::debug!(path = %path.display(), "telemetry part not present");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping telemetry part");
            }
        }
    }
    Ok(rows)
}

/// Raw bytes of one export. Decoding happens per row in the CSV reader.
async fn read_source(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path, e))
}

fn map_read_error(path: &Path, source: std::io::Error) -> InsightsError {
    if source.kind() == ErrorKind::NotFound {
        InsightsError::SourceNotFound(path.to_path_buf())
    } else {
        InsightsError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

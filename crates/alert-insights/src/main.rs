mod bootstrap;
mod render;

use anyhow::Result;
use insights_core::settings::Settings;
use insights_runtime::fetcher::DashboardFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Alert Insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Alerts: {}, Format: {}",
        settings.alerts.display(),
        settings.format
    );

    let fetcher = DashboardFetcher::from_settings(&settings);
    let result = match fetcher.fetch().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "dashboard fetch failed");
            return Err(e.into());
        }
    };

    let output = if settings.wants_text() {
        render::render_text(&result)
    } else {
        render::render_json(&result)?
    };
    println!("{}", output);

    tracing::info!(
        alerts = result.summary.total_alerts,
        files = result.metadata.source_files.len(),
        "report written"
    );
    Ok(())
}

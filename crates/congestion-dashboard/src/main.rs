mod bootstrap;
mod report;

use std::sync::Arc;

use anyhow::Result;
use congestion_core::settings::{LastUsedParams, Settings};
use congestion_runtime::data_manager::FileDataSource;
use congestion_runtime::orchestrator::DashboardOrchestrator;
use congestion_ui::app::App;

use crate::bootstrap::LogTarget;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_target = match settings.view.as_str() {
        "report" => LogTarget::Stderr,
        _ => LogTarget::for_dashboard(settings.log_file.as_deref()),
    };
    bootstrap::setup_logging(&settings.log_level, &log_target)?;

    tracing::info!("Lane Congestion Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Primary: {}, Fallback: {}",
        settings.view,
        settings.theme,
        settings.primary,
        settings.fallback
    );

    let data_dir = bootstrap::resolve_data_dir(
        settings.data_dir.as_deref(),
        &settings.primary,
        &settings.fallback,
    );
    tracing::info!(data_dir = %data_dir.display(), "resolved data directory");
    let source = FileDataSource::new(data_dir);

    match settings.view.as_str() {
        "report" => {
            let report = report::build_report(
                &source,
                &settings.primary,
                &settings.fallback,
                settings.filter_selection(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.has_data() {
                anyhow::bail!(
                    "no data could be loaded from {} or {}",
                    settings.primary,
                    settings.fallback
                );
            }
        }

        _ => {
            tracing::info!("Starting interactive dashboard...");

            let orchestrator = DashboardOrchestrator::new(
                Arc::new(source),
                settings.primary.clone(),
                settings.fallback.clone(),
                settings.filter_selection(),
            );
            let (rx, handle) = orchestrator.start();

            let app = App::new(&settings.theme, settings.primary.clone(), settings.filter_selection());

            // The TUI exits on 'q' / Ctrl+C itself and stops the orchestrator.
            let selection = app.run(rx, handle).await?;

            let mut params = LastUsedParams::from(&settings);
            params.filters = (!selection.is_empty()).then_some(selection);
            if let Err(e) = params.save_to(&LastUsedParams::config_path()) {
                tracing::warn!(error = %e, "failed to persist filter selection");
            }
        }
    }

    Ok(())
}

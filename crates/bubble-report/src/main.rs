mod bootstrap;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use report_core::settings::Settings;
use report_data::analysis::analyze_report;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("bubble-report v{} starting", env!("CARGO_PKG_VERSION"));

    let window = settings
        .window()
        .context("Start date must be before End date")?;

    tracing::info!(
        "Window: {} .. {}, users: {}, posts: {}",
        window.start(),
        window.end(),
        settings.user_csv.display(),
        settings.user_posts_csv.display()
    );

    let bundle = analyze_report(
        &settings.user_csv,
        &settings.user_posts_csv,
        &window,
        settings.duplicate_policy(),
    )
    .context("Failed to build the engagement report")?;

    tracing::info!(
        "{} influencers, {} active, {} skipped",
        bundle.statistics.num_influencers,
        bundle.statistics.num_active_influencers,
        bundle.skipped_users.len()
    );

    print!("{}", report::render_summary(&bundle));

    if let Some(path) = settings.json_out.as_ref() {
        report::write_json(&bundle, path)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

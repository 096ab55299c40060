mod bootstrap;
mod schedule;
mod tasks;

use anyhow::Result;
use todak_core::config::{AppConfig, LoadOptions};
use tracing::info;

fn init_logging(config: &AppConfig) {
    use todak_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    if let Some(cheer_schedule) = app.cheer_schedule.clone() {
        let cycle = app.cheer_cycle.clone();
        let _ = schedule::spawn_daily(cheer_schedule, "cheer", move || {
            let cycle = cycle.clone();
            async move { cycle.run().await }
        });
    }
    if let Some(summary_schedule) = app.summary_schedule.clone() {
        let cycle = app.summary_cycle.clone();
        let _ = schedule::spawn_daily(summary_schedule, "summary", move || {
            let cycle = cycle.clone();
            async move { cycle.run().await }
        });
    }

    info!(
        transport_mode = if app.slack_runner.is_noop_transport() { "noop" } else { "socket" },
        "slack runner transport mode initialized"
    );
    app.slack_runner.start().await?;

    info!("todak-server started");
    wait_for_shutdown().await?;
    info!("todak-server stopping");

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

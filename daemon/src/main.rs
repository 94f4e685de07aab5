//! SnipeBot - main entry point

use snipebot_daemon_lib::{AppState, DaemonSettings, Runtime};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snipebot_daemon=debug,snipebot_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SnipeBot");

    let settings = DaemonSettings::load();
    let run_for = settings.run_duration_secs.map(Duration::from_secs);
    let auto_start = settings.auto_start;

    let state = AppState::new(settings);
    state.bootstrap().await;

    let runtime = Runtime::spawn(&state);
    if auto_start {
        state.engine.start().await;
    } else {
        tracing::info!("Auto-start disabled; engine idle (market data only)");
    }

    match run_for {
        Some(limit) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received"),
                _ = tokio::time::sleep(limit) => tracing::info!("Run duration of {}s reached", limit.as_secs()),
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            tracing::info!("Ctrl+C received");
        }
    }

    state.engine.stop().await;
    runtime.shutdown().await;

    let status = state.engine.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}

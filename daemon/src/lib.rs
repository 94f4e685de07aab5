//! SnipeBot daemon - headless runtime around the snipe engine

pub mod market_feed;
pub mod network_monitor;
pub mod queue_worker;
pub mod settings;
pub mod state;
pub mod status_reporter;
pub mod tasks;

pub use settings::DaemonSettings;
pub use state::AppState;
pub use tasks::TaskHandle;

use tracing::info;

/// All background loops for one engine
pub struct Runtime {
    tasks: Vec<TaskHandle>,
}

impl Runtime {
    /// Spawn every loop at the cadences in the settings
    pub fn spawn(state: &AppState) -> Self {
        let engine = &state.engine;
        let intervals = &state.settings.intervals;

        let tasks = vec![
            market_feed::spawn_market_feed(engine.clone(), intervals.market_tick()),
            queue_worker::spawn_queue_worker(
                engine.clone(),
                intervals.queue_drain(),
                intervals.retention_sweep(),
            ),
            network_monitor::spawn_network_monitor(engine.clone(), intervals.network_stats()),
            status_reporter::spawn_status_reporter(engine.clone(), intervals.status_report()),
        ];

        info!("Spawned {} background task(s)", tasks.len());
        Self { tasks }
    }

    /// Cancel every loop and wait for them to exit
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.cancel();
        }
        for task in self.tasks {
            let name = task.name();
            task.stop().await;
            tracing::debug!("{} stopped", name);
        }
        info!("Background tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_runtime_spawns_and_shuts_down() {
        let mut settings = DaemonSettings::demo();
        settings.seed = Some(21);
        let state = AppState::new(settings);
        state.bootstrap().await;

        let runtime = Runtime::spawn(&state);
        state.engine.start().await;
        tokio::time::sleep(Duration::from_secs(3)).await;

        // the market feed has sampled the demo token
        assert_eq!(state.engine.market_data().await.len(), 1);

        state.engine.stop().await;
        runtime.shutdown().await;
        assert!(!state.engine.status().await.is_running);
    }
}

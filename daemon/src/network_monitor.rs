//! Periodic network stats refresh

use crate::tasks::TaskHandle;
use snipebot_engine::SnipeEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn spawn_network_monitor(engine: Arc<SnipeEngine>, period: Duration) -> TaskHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        info!("Network monitor started (every {}ms)", period.as_millis());
        let mut interval = tokio::time::interval(period);
        // the engine starts from known defaults
        interval.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Network monitor cancelled, exiting");
                    return;
                }
                _ = interval.tick() => {
                    engine.update_network_stats();
                }
            }
        }
    });

    TaskHandle::new("network monitor", cancel, task)
}

//! Queue worker - drains the transaction queue, sweeps old items and settles outcomes

use crate::tasks::TaskHandle;
use snipebot_engine::SnipeEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drain every `drain_period`, purge every `sweep_period`
pub fn spawn_queue_worker(
    engine: Arc<SnipeEngine>,
    drain_period: Duration,
    sweep_period: Duration,
) -> TaskHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(queue_worker_loop(engine, drain_period, sweep_period, cancel.clone()));
    TaskHandle::new("queue worker", cancel, task)
}

async fn queue_worker_loop(
    engine: Arc<SnipeEngine>,
    drain_period: Duration,
    sweep_period: Duration,
    cancel: CancellationToken,
) {
    info!(
        "Queue worker started (drain {}ms, sweep {}ms)",
        drain_period.as_millis(),
        sweep_period.as_millis()
    );

    let mut events = engine.subscribe();
    let mut drain = tokio::time::interval(drain_period);
    let mut sweep = tokio::time::interval(sweep_period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Queue worker cancelled, exiting");
                return;
            }
            _ = drain.tick() => {
                // Runs detached; a drain still in flight makes this one a no-op
                let engine = engine.clone();
                tokio::spawn(async move {
                    match engine.process_queue().await {
                        Some(report) if report.attempted > 0 => debug!(
                            "Batch done: {} attempted, {} confirmed, {} retrying, {} failed",
                            report.attempted, report.confirmed, report.retried, report.failed
                        ),
                        Some(_) => {}
                        None => debug!("Previous batch still running"),
                    }
                });
            }
            _ = sweep.tick() => {
                let purged = engine.purge_expired().await;
                if purged > 0 {
                    debug!("Swept {} expired queue item(s)", purged);
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    let engine = engine.clone();
                    tokio::spawn(async move { engine.handle_queue_event(event).await });
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Queue worker missed {} queue event(s)", missed);
                }
                Err(RecvError::Closed) => return,
            },
        }
    }
}

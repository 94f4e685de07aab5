//! Periodic status line

use crate::tasks::TaskHandle;
use snipebot_engine::SnipeEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn spawn_status_reporter(engine: Arc<SnipeEngine>, period: Duration) -> TaskHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = interval.tick() => {
                    let s = engine.status().await;
                    info!(
                        "Status: running={} snipes={} positions={} txs={} success={:.1}% profit={:.6} | queue {} queued / {} processing / {} failed | base fee {:.2} gwei, {} congestion",
                        s.is_running,
                        s.active_snipes,
                        s.open_positions,
                        s.total_transactions,
                        s.success_rate,
                        s.total_profit,
                        s.transaction_queue.pending,
                        s.transaction_queue.processing,
                        s.transaction_queue.failed,
                        s.gas_estimator.current_base_fee,
                        s.gas_estimator.network_congestion
                    );
                }
            }
        }
    });

    TaskHandle::new("status reporter", cancel, task)
}

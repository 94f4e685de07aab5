//! Market feed: samples prices and runs the strategies once per tick

use crate::tasks::TaskHandle;
use snipebot_engine::SnipeEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub fn spawn_market_feed(engine: Arc<SnipeEngine>, period: Duration) -> TaskHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(market_feed_loop(engine, period, cancel.clone()));
    TaskHandle::new("market feed", cancel, task)
}

async fn market_feed_loop(engine: Arc<SnipeEngine>, period: Duration, cancel: CancellationToken) {
    info!("Market feed started (every {}ms)", period.as_millis());
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Market feed cancelled, exiting");
                return;
            }
            _ = interval.tick() => {
                let report = engine.tick().await;
                if report.buys_queued > 0 || report.sells_queued > 0 {
                    debug!(
                        "Tick: {} token(s) sampled, {} buy(s) and {} sell(s) queued",
                        report.sampled, report.buys_queued, report.sells_queued
                    );
                }
            }
        }
    }
}

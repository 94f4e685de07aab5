//! Batch processor draining the transaction queue

use super::broadcaster::Broadcaster;
use super::queue::{FailureOutcome, SharedQueue};
use crate::config::QueueSettings;
use chrono::Utc;
use snipebot_core::{ExecutionReceipt, TransactionQueueItem};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Outcome notifications for queue items
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// Broadcast accepted; the item is terminal `confirmed`
    Confirmed {
        item: TransactionQueueItem,
        receipt: ExecutionReceipt,
    },
    /// Execution failed; the item will be re-queued after the cool-down
    RetryScheduled {
        item: TransactionQueueItem,
        reason: String,
    },
    /// A failed item went back to `queued`
    Requeued { item_id: String },
    /// Retries exhausted; the item is terminal `failed`
    Failed {
        item: TransactionQueueItem,
        reason: String,
    },
}

/// Summary of one processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub confirmed: usize,
    pub retried: usize,
    pub failed: usize,
}

/// Releases the in-flight latch when a run ends, including on early return
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drains the queue in bounded batches, one item at a time.
/// At most one run is active; overlapping calls are dropped, not queued.
pub struct QueueProcessor {
    queue: SharedQueue,
    broadcaster: Arc<dyn Broadcaster>,
    settings: QueueSettings,
    in_flight: AtomicBool,
    events: broadcast::Sender<QueueEvent>,
}

impl QueueProcessor {
    pub fn new(queue: SharedQueue, broadcaster: Arc<dyn Broadcaster>, settings: QueueSettings) -> Self {
        let (events, _) = broadcast::channel(settings.event_buffer.max(1));
        Self {
            queue,
            broadcaster,
            settings,
            in_flight: AtomicBool::new(false),
            events,
        }
    }

    pub fn queue(&self) -> &SharedQueue {
        &self.queue
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one batch. Returns `None` if another run is already in flight.
    pub async fn process_queue(&self) -> Option<BatchReport> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Queue run already in flight, skipping");
            return None;
        };

        let batch = self.queue.read().await.next_batch(self.settings.batch_size);
        let mut report = BatchReport::default();
        if batch.is_empty() {
            return Some(report);
        }

        debug!("Processing batch of {} queue item(s)", batch.len());

        for (index, id) in batch.iter().enumerate() {
            let request = self.queue.write().await.mark_processing(id, Utc::now());
            // Purged or withdrawn since the batch was selected
            let Some(request) = request else { continue };
            report.attempted += 1;

            match self.broadcaster.execute(&request).await {
                Ok(receipt) => {
                    let confirmed = self.queue.write().await.mark_confirmed(id);
                    if let Some(item) = confirmed {
                        info!(
                            "Confirmed {} {} (nonce {}, retries {}) tx {}",
                            item.trade_type, item.id, item.nonce, item.retry_count, receipt.hash
                        );
                        report.confirmed += 1;
                        let _ = self.events.send(QueueEvent::Confirmed { item, receipt });
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    let failed = self.queue.write().await.mark_failed(id, self.settings.max_retries);
                    match failed {
                        Some((item, FailureOutcome::Retry(attempt))) => {
                            warn!(
                                "Queue item {} (nonce {}) failed: {} - retry {}/{} in {}ms",
                                item.id,
                                item.nonce,
                                reason,
                                attempt,
                                self.settings.max_retries,
                                self.settings.retry_cooldown_ms
                            );
                            report.retried += 1;
                            self.schedule_requeue(item.id.clone());
                            let _ = self.events.send(QueueEvent::RetryScheduled { item, reason });
                        }
                        Some((item, FailureOutcome::Terminal)) => {
                            error!(
                                "Queue item {} (nonce {}) failed permanently after {} retries: {}",
                                item.id, item.nonce, item.retry_count, reason
                            );
                            report.failed += 1;
                            let _ = self.events.send(QueueEvent::Failed { item, reason });
                        }
                        None => {}
                    }
                }
            }

            if index + 1 < batch.len() {
                tokio::time::sleep(self.settings.batch_pacing()).await;
            }
        }

        Some(report)
    }

    fn schedule_requeue(&self, id: String) {
        let queue = self.queue.clone();
        let events = self.events.clone();
        let cooldown = self.settings.retry_cooldown();

        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            if queue.write().await.requeue(&id) {
                let _ = events.send(QueueEvent::Requeued { item_id: id });
            }
        });
    }
}

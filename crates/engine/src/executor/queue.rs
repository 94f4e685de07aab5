//! Nonce-assigning priority queue of trade intents

use chrono::{DateTime, Utc};
use snipebot_core::{
    ExecutionRequest, GasEstimation, QueueSnapshot, QueueStatus, TokenAddress, TradeType,
    TransactionQueueItem,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Queue shared between the engine and the processor
pub type SharedQueue = Arc<RwLock<TransactionQueue>>;

/// A trade intent to enqueue
#[derive(Debug, Clone)]
pub struct QueueOrder {
    pub snipe_config_id: String,
    pub token_address: TokenAddress,
    pub trade_type: TradeType,
    /// BUY: native currency to spend. SELL: token quantity.
    pub amount: f64,
    /// Percent tolerance the broadcaster should apply
    pub slippage: f64,
    /// 1..=10, higher first
    pub priority: u8,
    pub gas_settings: GasEstimation,
}

/// What happened to an item after a failed execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Will return to `queued` after the cool-down; carries the new retry count
    Retry(u32),
    /// Retries exhausted, the item stays `failed`
    Terminal,
}

#[derive(Debug, Clone)]
struct QueueEntry {
    item: TransactionQueueItem,
    token_address: TokenAddress,
    amount: f64,
    slippage: f64,
}

/// Ordered by priority descending, then creation time ascending, then nonce.
///
/// Nonces come from a process-lifetime counter and are never reused, even
/// after their items are purged.
#[derive(Debug)]
pub struct TransactionQueue {
    entries: Vec<QueueEntry>,
    next_nonce: u64,
    retention: chrono::Duration,
}

impl TransactionQueue {
    pub fn new(retention: chrono::Duration) -> Self {
        Self {
            entries: Vec::new(),
            next_nonce: 0,
            retention,
        }
    }

    /// Enqueue an order created now. Returns the item id.
    pub fn enqueue(&mut self, order: QueueOrder) -> String {
        self.enqueue_at(order, Utc::now())
    }

    /// Enqueue with an explicit creation time
    pub fn enqueue_at(&mut self, order: QueueOrder, created_at: DateTime<Utc>) -> String {
        let nonce = self.next_nonce;
        self.next_nonce += 1;

        let item = TransactionQueueItem {
            id: uuid::Uuid::new_v4().to_string(),
            snipe_config_id: order.snipe_config_id,
            trade_type: order.trade_type,
            priority: order.priority,
            nonce,
            gas_settings: order.gas_settings,
            status: QueueStatus::Queued,
            created_at,
            executed_at: None,
            retry_count: 0,
        };
        let id = item.id.clone();

        // Insert before the first entry that sorts after the new one
        let pos = self
            .entries
            .iter()
            .position(|e| {
                e.item.priority < item.priority
                    || (e.item.priority == item.priority && e.item.created_at > item.created_at)
            })
            .unwrap_or(self.entries.len());

        info!(
            "Queued {} for config {} (priority {}, nonce {}, position {})",
            item.trade_type, item.snipe_config_id, item.priority, nonce, pos
        );

        self.entries.insert(
            pos,
            QueueEntry {
                item,
                token_address: order.token_address,
                amount: order.amount,
                slippage: order.slippage,
            },
        );
        id
    }

    /// Ids of the first `size` queued items in drain order
    pub fn next_batch(&self, size: usize) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.item.status == QueueStatus::Queued)
            .take(size)
            .map(|e| e.item.id.clone())
            .collect()
    }

    /// Move a queued item to `processing` and build its execution request.
    /// `None` if the item is gone or no longer queued.
    pub fn mark_processing(&mut self, id: &str, now: DateTime<Utc>) -> Option<ExecutionRequest> {
        let entry = self.entry_mut(id)?;
        if entry.item.status != QueueStatus::Queued {
            return None;
        }
        entry.item.status = QueueStatus::Processing;
        entry.item.executed_at = Some(now);

        Some(ExecutionRequest {
            item_id: entry.item.id.clone(),
            to: entry.token_address.clone(),
            trade_type: entry.item.trade_type,
            amount: entry.amount,
            slippage: entry.slippage,
            gas_settings: entry.item.gas_settings.clone(),
            nonce: entry.item.nonce,
        })
    }

    /// `processing -> confirmed`
    pub fn mark_confirmed(&mut self, id: &str) -> Option<TransactionQueueItem> {
        let entry = self.entry_mut(id)?;
        if entry.item.status != QueueStatus::Processing {
            return None;
        }
        entry.item.status = QueueStatus::Confirmed;
        Some(entry.item.clone())
    }

    /// `processing -> failed`, counting a retry while `retry_count < max_retries`
    pub fn mark_failed(
        &mut self,
        id: &str,
        max_retries: u32,
    ) -> Option<(TransactionQueueItem, FailureOutcome)> {
        let entry = self.entry_mut(id)?;
        if entry.item.status != QueueStatus::Processing {
            return None;
        }
        entry.item.status = QueueStatus::Failed;

        let outcome = if entry.item.retry_count < max_retries {
            entry.item.retry_count += 1;
            FailureOutcome::Retry(entry.item.retry_count)
        } else {
            FailureOutcome::Terminal
        };
        Some((entry.item.clone(), outcome))
    }

    /// `failed -> queued` after a cool-down. No-op if the item was purged meanwhile.
    pub fn requeue(&mut self, id: &str) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.item.status == QueueStatus::Failed => {
                entry.item.status = QueueStatus::Queued;
                debug!("Re-queued {} (retry {})", id, entry.item.retry_count);
                true
            }
            _ => false,
        }
    }

    /// Withdraw an item that has not started executing
    pub fn cancel(&mut self, id: &str) -> Option<TransactionQueueItem> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.item.id == id && e.item.status == QueueStatus::Queued)?;
        Some(self.entries.remove(pos).item)
    }

    /// Drop every item created at least `retention` before `now`, whatever its status
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> Vec<TransactionQueueItem> {
        let retention = self.retention;
        let mut purged = Vec::new();
        self.entries.retain(|e| {
            if now - e.item.created_at >= retention {
                purged.push(e.item.clone());
                false
            } else {
                true
            }
        });

        if !purged.is_empty() {
            info!("Purged {} queue item(s) older than {}s", purged.len(), retention.num_seconds());
        }
        purged
    }

    pub fn get(&self, id: &str) -> Option<&TransactionQueueItem> {
        self.entries.iter().find(|e| e.item.id == id).map(|e| &e.item)
    }

    /// Read-only copy in queue order
    pub fn items(&self) -> Vec<TransactionQueueItem> {
        self.entries.iter().map(|e| e.item.clone()).collect()
    }

    /// Nonce the next enqueue will receive
    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let count = |status: QueueStatus| self.entries.iter().filter(|e| e.item.status == status).count();
        QueueSnapshot {
            pending: count(QueueStatus::Queued),
            processing: count(QueueStatus::Processing),
            failed: count(QueueStatus::Failed),
            next_nonce: self.next_nonce,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut QueueEntry> {
        self.entries.iter_mut().find(|e| e.item.id == id)
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new(chrono::Duration::seconds(300))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn gas() -> GasEstimation {
        GasEstimation {
            base_fee: 15.0,
            max_fee_per_gas: 32.0,
            max_priority_fee_per_gas: 2.0,
            gas_limit: 160_000,
            estimated_cost: 0.00512,
            execution_time: 22.0,
            confidence: 0.9,
        }
    }

    pub(crate) fn order(config_id: &str, priority: u8) -> QueueOrder {
        QueueOrder {
            snipe_config_id: config_id.to_string(),
            token_address: TokenAddress::parse("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984").unwrap(),
            trade_type: TradeType::Buy,
            amount: 0.5,
            slippage: 12.0,
            priority,
            gas_settings: gas(),
        }
    }

    #[test]
    fn test_nonces_strictly_increasing() {
        let mut queue = TransactionQueue::default();
        let ids: Vec<_> = (0..20).map(|i| queue.enqueue(order("c", (i % 10 + 1) as u8))).collect();
        let mut nonces: Vec<_> = ids.iter().map(|id| queue.get(id).unwrap().nonce).collect();
        // assignment order is enqueue order
        assert_eq!(nonces, (0..20).collect::<Vec<u64>>());
        nonces.dedup();
        assert_eq!(nonces.len(), 20);
        assert_eq!(queue.next_nonce(), 20);
    }

    #[test]
    fn test_nonce_not_reused_after_purge() {
        let mut queue = TransactionQueue::default();
        let t0 = Utc::now();
        queue.enqueue_at(order("c", 5), t0);
        queue.enqueue_at(order("c", 5), t0);
        assert_eq!(queue.purge_expired(t0 + Duration::seconds(301)).len(), 2);
        let id = queue.enqueue(order("c", 5));
        assert_eq!(queue.get(&id).unwrap().nonce, 2);
    }

    #[test]
    fn test_priority_then_fifo_ordering() {
        let mut queue = TransactionQueue::default();
        let t0 = Utc::now();
        let priorities = [1u8, 5, 3, 5, 2];
        let ids: Vec<_> = priorities
            .iter()
            .enumerate()
            .map(|(i, p)| queue.enqueue_at(order(&format!("c{}", i), *p), t0 + Duration::milliseconds(i as i64)))
            .collect();

        let batch = queue.next_batch(5);
        assert_eq!(batch, vec![ids[1].clone(), ids[3].clone(), ids[2].clone(), ids[4].clone(), ids[0].clone()]);

        let items = queue.items();
        for pair in items.windows(2) {
            assert!(
                pair[0].priority > pair[1].priority
                    || (pair[0].priority == pair[1].priority && pair[0].created_at <= pair[1].created_at)
            );
        }
    }

    #[test]
    fn test_equal_timestamps_stay_fifo() {
        let mut queue = TransactionQueue::default();
        let t0 = Utc::now();
        let a = queue.enqueue_at(order("a", 4), t0);
        let b = queue.enqueue_at(order("b", 4), t0);
        let c = queue.enqueue_at(order("c", 4), t0);
        assert_eq!(queue.next_batch(3), vec![a, b, c]);
    }

    #[test]
    fn test_next_batch_skips_non_queued() {
        let mut queue = TransactionQueue::default();
        let a = queue.enqueue(order("a", 9));
        let b = queue.enqueue(order("b", 8));
        queue.mark_processing(&a, Utc::now()).unwrap();
        assert_eq!(queue.next_batch(3), vec![b]);
    }

    #[test]
    fn test_state_machine() {
        let mut queue = TransactionQueue::default();
        let id = queue.enqueue(order("a", 5));

        // cannot confirm or fail before processing
        assert!(queue.mark_confirmed(&id).is_none());
        assert!(queue.mark_failed(&id, 3).is_none());

        let request = queue.mark_processing(&id, Utc::now()).unwrap();
        assert_eq!(request.nonce, 0);
        assert_eq!(request.amount, 0.5);
        assert_eq!(request.slippage, 12.0);
        assert!(queue.get(&id).unwrap().executed_at.is_some());
        // already processing
        assert!(queue.mark_processing(&id, Utc::now()).is_none());

        let confirmed = queue.mark_confirmed(&id).unwrap();
        assert_eq!(confirmed.status, QueueStatus::Confirmed);
        assert!(!queue.requeue(&id));
    }

    #[test]
    fn test_retry_bound() {
        let mut queue = TransactionQueue::default();
        let id = queue.enqueue(order("a", 5));

        let mut requeues = 0;
        loop {
            queue.mark_processing(&id, Utc::now()).unwrap();
            let (item, outcome) = queue.mark_failed(&id, 3).unwrap();
            assert_eq!(item.status, QueueStatus::Failed);
            match outcome {
                FailureOutcome::Retry(n) => {
                    requeues += 1;
                    assert_eq!(n, requeues);
                    assert!(queue.requeue(&id));
                }
                FailureOutcome::Terminal => break,
            }
        }

        assert_eq!(requeues, 3);
        let item = queue.get(&id).unwrap();
        assert_eq!(item.status, QueueStatus::Failed);
        assert_eq!(item.retry_count, 3);
        assert!(queue.next_batch(1).is_empty());
    }

    #[test]
    fn test_purge_removes_confirmed_items_past_retention() {
        let mut queue = TransactionQueue::default();
        let t0 = Utc::now();
        let old = queue.enqueue_at(order("a", 5), t0);
        let fresh = queue.enqueue_at(order("b", 5), t0 + Duration::seconds(200));
        queue.mark_processing(&old, t0).unwrap();
        queue.mark_confirmed(&old).unwrap();

        let purged = queue.purge_expired(t0 + Duration::seconds(301));
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].id, old);
        assert_eq!(purged[0].status, QueueStatus::Confirmed);
        assert!(queue.get(&old).is_none());
        assert!(queue.get(&fresh).is_some());
    }

    #[test]
    fn test_cancel_only_queued() {
        let mut queue = TransactionQueue::default();
        let a = queue.enqueue(order("a", 5));
        let b = queue.enqueue(order("b", 5));
        queue.mark_processing(&b, Utc::now()).unwrap();
        assert!(queue.cancel(&a).is_some());
        assert!(queue.cancel(&b).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_snapshot_counts() {
        let mut queue = TransactionQueue::default();
        let a = queue.enqueue(order("a", 5));
        let b = queue.enqueue(order("b", 5));
        queue.enqueue(order("c", 5));
        queue.mark_processing(&a, Utc::now()).unwrap();
        queue.mark_processing(&b, Utc::now()).unwrap();
        queue.mark_failed(&b, 0).unwrap();

        let snap = queue.snapshot();
        assert_eq!(snap.pending, 1);
        assert_eq!(snap.processing, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.next_nonce, 3);
    }
}

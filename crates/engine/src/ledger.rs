//! Transaction history

use chrono::Utc;
use serde::{Deserialize, Serialize};
use snipebot_core::{TokenAddress, TradeType, Transaction, TransactionStatus};
use tracing::{debug, info};

/// Fields of a transaction about to be recorded
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub hash: String,
    pub trade_type: TradeType,
    pub token_address: TokenAddress,
    pub token_symbol: String,
    pub amount: f64,
    pub price: f64,
    pub gas_used: u64,
    pub gas_price: f64,
    pub profit: Option<f64>,
}

/// Aggregates over resolved transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub resolved: usize,
    pub successful: usize,
    /// Percent of resolved transactions that succeeded
    pub success_rate: f64,
    pub total_profit: f64,
}

/// Newest-first record of every transaction. Records are never deleted.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a broadcast transaction awaiting confirmation
    pub fn record_pending(&mut self, pending: PendingTransaction) -> Transaction {
        let tx = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            hash: pending.hash,
            trade_type: pending.trade_type,
            token_address: pending.token_address,
            token_symbol: pending.token_symbol,
            amount: pending.amount,
            price: pending.price,
            gas_used: pending.gas_used,
            gas_price: pending.gas_price,
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
            profit: pending.profit,
        };
        debug!("Recorded pending {} {} ({})", tx.trade_type, tx.token_symbol, tx.hash);
        self.transactions.insert(0, tx.clone());
        tx
    }

    /// Add an already-settled record, keeping newest-first order
    pub fn push_historical(&mut self, tx: Transaction) {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.timestamp < tx.timestamp)
            .unwrap_or(self.transactions.len());
        self.transactions.insert(pos, tx);
    }

    /// Settle a pending transaction. Only the first call has an effect.
    pub fn resolve(&mut self, id: &str, success: bool) -> Option<Transaction> {
        let tx = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id && t.status == TransactionStatus::Pending)?;

        tx.status = if success {
            TransactionStatus::Success
        } else {
            TransactionStatus::Failed
        };
        info!("Transaction {} {:?} ({} {})", tx.hash, tx.status, tx.trade_type, tx.token_symbol);
        Some(tx.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn list(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn stats(&self) -> LedgerStats {
        let resolved = self
            .transactions
            .iter()
            .filter(|t| t.status != TransactionStatus::Pending)
            .count();
        let successful: Vec<_> = self
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Success)
            .collect();
        let total_profit = successful.iter().filter_map(|t| t.profit).sum();
        let success_rate = if resolved == 0 {
            0.0
        } else {
            successful.len() as f64 / resolved as f64 * 100.0
        };

        LedgerStats {
            resolved,
            successful: successful.len(),
            success_rate,
            total_profit,
        }
    }
}

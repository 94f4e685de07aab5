//! Bot status snapshot consumed by the presentation layer

use crate::models::Congestion;
use serde::{Deserialize, Serialize};

/// Gas view for the status panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasSnapshot {
    pub current_base_fee: f64,
    pub recommended_gas_price: f64,
    pub fast_gas_price: f64,
    pub network_congestion: Congestion,
}

/// Queue counters for the status panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub pending: usize,
    pub processing: usize,
    pub failed: usize,
    pub next_nonce: u64,
}

/// Aggregate bot status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub is_running: bool,
    pub active_snipes: usize,
    pub total_transactions: usize,
    pub total_profit: f64,
    /// Percent of resolved transactions that succeeded
    pub success_rate: f64,
    /// Seconds since the last start, 0 while stopped
    pub uptime: u64,
    pub open_positions: usize,
    pub gas_estimator: GasSnapshot,
    pub transaction_queue: QueueSnapshot,
}

//! Transaction queue models

use crate::models::{GasEstimation, TradeType};
use crate::types::TokenAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a queued trade intent
///
/// `Queued -> Processing -> Confirmed | Failed`, with `Failed -> Queued` while retries remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Queued,
    Processing,
    Confirmed,
    Failed,
}

/// A pending trade intent in the transaction queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueueItem {
    pub id: String,
    pub snipe_config_id: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub priority: u8,
    pub nonce: u64,
    pub gas_settings: GasEstimation,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
}

/// What gets handed to a broadcaster for one queue item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub item_id: String,
    /// Token contract being traded
    pub to: TokenAddress,
    pub trade_type: TradeType,
    /// BUY: native currency to spend. SELL: token quantity.
    pub amount: f64,
    /// Price tolerance in percent
    pub slippage: f64,
    pub gas_settings: GasEstimation,
    pub nonce: u64,
}

/// Broadcaster acknowledgement for an executed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub hash: String,
    pub gas_used: u64,
    /// gwei
    pub gas_price: f64,
}

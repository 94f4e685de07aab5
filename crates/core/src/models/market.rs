//! Market-related models

use crate::types::TokenAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest market snapshot for a token. Replaced wholesale on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub token_address: TokenAddress,
    pub price: f64,
    pub price_change_1m: f64,
    pub price_change_5m: f64,
    pub price_change_1h: f64,
    pub volume_1h: f64,
    pub liquidity: f64,
    pub holders: u32,
    pub timestamp: DateTime<Utc>,
}

/// Liquidity/volatility/volume reading used to size slippage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConditions {
    /// Pool liquidity in USD
    pub liquidity: f64,
    /// Volatility in percent
    pub volatility: f64,
    /// 24h volume in USD
    pub volume_24h: f64,
}

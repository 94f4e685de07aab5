//! Trade-related models

use crate::types::{Percent, TokenAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade type (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => f.write_str("buy"),
            TradeType::Sell => f.write_str("sell"),
        }
    }
}

/// Settlement state of a historical transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

/// Transaction record kept in the in-memory ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub hash: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub token_address: TokenAddress,
    pub token_symbol: String,
    /// BUY: native currency spent. SELL: token quantity sold.
    pub amount: f64,
    /// Price at execution
    pub price: f64,
    pub gas_used: u64,
    pub gas_price: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Realized profit in native currency (sells only)
    #[serde(default)]
    pub profit: Option<f64>,
}

/// How quickly an exit should be executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    High,
}

/// Which exit rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitTrigger {
    StopLoss,
    TakeProfit,
    PartialSell,
    TrailingStop,
}

/// Outcome of an exit evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitDecision {
    pub should_sell: bool,
    /// Share of the current holding to close
    pub sell_percentage: Percent,
    pub reason: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub trigger: Option<ExitTrigger>,
    pub price_change: Percent,
}

impl ExitDecision {
    /// Nothing fired; keep holding
    pub fn hold(price_change: Percent) -> Self {
        Self {
            should_sell: false,
            sell_percentage: Percent::new(100.0),
            reason: String::new(),
            urgency: Urgency::Normal,
            trigger: None,
            price_change,
        }
    }

    pub fn sell(
        trigger: ExitTrigger,
        sell_percentage: f64,
        urgency: Urgency,
        price_change: Percent,
        reason: String,
    ) -> Self {
        Self {
            should_sell: true,
            sell_percentage: Percent::new(sell_percentage),
            reason,
            urgency,
            trigger: Some(trigger),
            price_change,
        }
    }

    pub fn is_full_exit(&self) -> bool {
        self.should_sell && self.sell_percentage.as_f64() >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_is_not_a_sell() {
        let hold = ExitDecision::hold(Percent::new(3.0));
        assert!(!hold.should_sell);
        assert!(!hold.is_full_exit());
        assert!(hold.trigger.is_none());
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::High > Urgency::Normal);
        assert!(Urgency::Normal > Urgency::Low);
    }

    #[test]
    fn test_trade_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TradeType::Sell).unwrap(), "\"sell\"");
        assert_eq!(TradeType::Buy.to_string(), "buy");
    }
}

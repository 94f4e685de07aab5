//! Gas and network fee models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network congestion bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Congestion {
    Low,
    Medium,
    High,
}

impl Congestion {
    pub const ALL: [Congestion; 3] = [Congestion::Low, Congestion::Medium, Congestion::High];

    /// Extra seconds to inclusion on top of the block time
    pub fn inclusion_penalty_secs(&self) -> f64 {
        match self {
            Congestion::Low => 5.0,
            Congestion::Medium => 10.0,
            Congestion::High => 20.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Congestion::Low => "low",
            Congestion::Medium => "medium",
            Congestion::High => "high",
        }
    }
}

impl fmt::Display for Congestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide network conditions. Fees are in gwei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub base_fee: f64,
    pub fast_gas_price: f64,
    #[serde(rename = "networkCongestion")]
    pub congestion: Congestion,
    /// Seconds
    pub avg_block_time: f64,
}

impl Default for NetworkStats {
    fn default() -> Self {
        Self {
            base_fee: 15.0,
            fast_gas_price: 25.0,
            congestion: Congestion::Medium,
            avg_block_time: 12.0,
        }
    }
}

/// EIP-1559 fee estimate for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimation {
    /// gwei
    pub base_fee: f64,
    /// gwei
    pub max_fee_per_gas: f64,
    /// gwei
    pub max_priority_fee_per_gas: f64,
    pub gas_limit: u64,
    /// Native currency
    pub estimated_cost: f64,
    /// Seconds
    pub execution_time: f64,
    /// 0..1
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_congestion_penalties() {
        assert_eq!(Congestion::High.inclusion_penalty_secs(), 20.0);
        assert_eq!(Congestion::Medium.inclusion_penalty_secs(), 10.0);
        assert_eq!(Congestion::Low.inclusion_penalty_secs(), 5.0);
    }

    #[test]
    fn test_network_stats_wire_shape() {
        let json = serde_json::to_value(NetworkStats::default()).unwrap();
        assert_eq!(json["baseFee"], 15.0);
        assert_eq!(json["networkCongestion"], "medium");
        assert_eq!(json["avgBlockTime"], 12.0);
    }
}

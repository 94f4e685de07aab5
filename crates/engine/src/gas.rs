//! EIP-1559 gas estimation from the current network stats

use crate::network::NetworkStatsMonitor;
use crate::rng::{uniform, SimRng};
use crate::store::EstimateStore;
use rand::Rng;
use snipebot_core::{GasEstimation, NetworkStats, TokenAddress};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Floor for the priority tip (gwei)
pub const MIN_PRIORITY_FEE: f64 = 2.0;
const GAS_LIMIT_MIN: u64 = 150_000;
const GAS_LIMIT_MAX: u64 = 200_000;
const GWEI_PER_NATIVE: f64 = 1e9;

/// Priority tip for a base fee: 10% of base, never below 2 gwei
pub fn priority_fee_for(base_fee: f64) -> f64 {
    f64::max(MIN_PRIORITY_FEE, base_fee * 0.1)
}

/// Fee cap: two base fees of headroom plus the tip
pub fn max_fee_for(base_fee: f64) -> f64 {
    base_fee * 2.0 + priority_fee_for(base_fee)
}

/// Deterministic part of an estimate given the sampled gas limit and confidence
pub fn estimation_for(stats: &NetworkStats, gas_limit: u64, confidence: f64) -> GasEstimation {
    let priority_fee = priority_fee_for(stats.base_fee);
    let max_fee_per_gas = max_fee_for(stats.base_fee);

    GasEstimation {
        base_fee: stats.base_fee,
        max_fee_per_gas,
        max_priority_fee_per_gas: priority_fee,
        gas_limit,
        estimated_cost: max_fee_per_gas * gas_limit as f64 / GWEI_PER_NATIVE,
        execution_time: stats.avg_block_time + stats.congestion.inclusion_penalty_secs(),
        confidence,
    }
}

/// Gas model keyed by token; the latest estimate per token is retained
pub struct GasModel {
    network: Arc<NetworkStatsMonitor>,
    estimates: EstimateStore<GasEstimation>,
    rng: SimRng,
}

impl GasModel {
    pub fn new(network: Arc<NetworkStatsMonitor>, rng: SimRng, capacity: usize) -> Self {
        Self {
            network,
            estimates: EstimateStore::with_capacity(capacity),
            rng,
        }
    }

    /// Estimate fees for trading `amount` of `token` and cache the result
    pub fn estimate_gas(&self, token: &TokenAddress, amount: f64) -> GasEstimation {
        let stats = self.network.snapshot();
        let (gas_limit, confidence) = self.rng.with(|rng| {
            (
                rng.gen_range(GAS_LIMIT_MIN..GAS_LIMIT_MAX),
                uniform(rng, 0.7, 1.0),
            )
        });

        let estimation = estimation_for(&stats, gas_limit, confidence);
        debug!(
            "Gas estimate for {} (amount {}): max fee {:.2} gwei, limit {}, cost {:.6}, eta {:.0}s",
            token.short(),
            amount,
            estimation.max_fee_per_gas,
            estimation.gas_limit,
            estimation.estimated_cost,
            estimation.execution_time
        );

        self.estimates.insert(token.clone(), estimation.clone());
        estimation
    }

    pub fn latest(&self, token: &TokenAddress) -> Option<GasEstimation> {
        self.estimates.get(token)
    }

    pub fn estimations(&self) -> HashMap<TokenAddress, GasEstimation> {
        self.estimates.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipebot_core::Congestion;

    fn token() -> TokenAddress {
        TokenAddress::parse("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984").unwrap()
    }

    #[test]
    fn test_fee_formulas() {
        // 10% of 15 is below the 2 gwei floor
        assert_eq!(priority_fee_for(15.0), 2.0);
        assert_eq!(priority_fee_for(40.0), 4.0);
        assert_eq!(max_fee_for(15.0), 32.0);
        assert_eq!(max_fee_for(40.0), 84.0);
    }

    #[test]
    fn test_estimation_for_congestion_penalty() {
        let stats = NetworkStats {
            base_fee: 20.0,
            fast_gas_price: 30.0,
            congestion: Congestion::High,
            avg_block_time: 12.0,
        };
        let est = estimation_for(&stats, 150_000, 0.8);
        assert_eq!(est.max_priority_fee_per_gas, 2.0);
        assert_eq!(est.max_fee_per_gas, 42.0);
        assert_eq!(est.execution_time, 32.0);
        assert!((est.estimated_cost - 42.0 * 150_000.0 / 1e9).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_gas_samples_in_range_and_caches() {
        let network = Arc::new(NetworkStatsMonitor::new(NetworkStats::default(), SimRng::seeded(1)));
        let model = GasModel::new(network, SimRng::seeded(2), 16);

        for _ in 0..50 {
            let est = model.estimate_gas(&token(), 0.5);
            assert!((150_000..200_000).contains(&est.gas_limit));
            assert!(est.confidence >= 0.7 && est.confidence < 1.0);
            assert_eq!(model.latest(&token()), Some(est));
        }
        assert_eq!(model.estimations().len(), 1);
    }

    #[test]
    fn test_estimate_reads_current_network_stats() {
        let network = Arc::new(NetworkStatsMonitor::new(NetworkStats::default(), SimRng::seeded(1)));
        let model = GasModel::new(network.clone(), SimRng::seeded(2), 16);

        network.set(NetworkStats {
            base_fee: 50.0,
            fast_gas_price: 70.0,
            congestion: Congestion::Low,
            avg_block_time: 10.0,
        });
        let est = model.estimate_gas(&token(), 1.0);
        assert_eq!(est.base_fee, 50.0);
        assert_eq!(est.max_fee_per_gas, 105.0);
        assert_eq!(est.execution_time, 15.0);
    }
}

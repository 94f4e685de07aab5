//! Network congestion monitor feeding the gas model

use crate::rng::{jitter, SimRng};
use rand::Rng;
use snipebot_core::{Congestion, NetworkStats};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Block time the jitter is centred on (seconds)
const BASE_BLOCK_TIME_SECS: f64 = 12.0;
const BASE_FEE_JITTER: f64 = 2.5;
const FAST_GAS_JITTER: f64 = 4.0;
const BLOCK_TIME_JITTER: f64 = 2.0;

/// Owns the process-wide [`NetworkStats`] and refreshes it on demand.
/// In the simulation each refresh is a random perturbation; a live monitor
/// would replace [`NetworkStatsMonitor::set`] calls with RPC readings.
pub struct NetworkStatsMonitor {
    stats: RwLock<NetworkStats>,
    rng: SimRng,
}

impl NetworkStatsMonitor {
    pub fn new(initial: NetworkStats, rng: SimRng) -> Self {
        Self {
            stats: RwLock::new(initial),
            rng,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> NetworkStats {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot wholesale. Negative fees are floored at zero.
    pub fn set(&self, mut stats: NetworkStats) {
        stats.base_fee = stats.base_fee.max(0.0);
        stats.fast_gas_price = stats.fast_gas_price.max(0.0);
        *self.stats.write().unwrap_or_else(PoisonError::into_inner) = stats;
    }

    /// Perturb fees, re-roll congestion and jitter the block time
    pub fn update(&self) -> NetworkStats {
        let previous = self.snapshot();
        let next = self.rng.with(|rng| NetworkStats {
            base_fee: (previous.base_fee + jitter(rng, BASE_FEE_JITTER)).max(0.0),
            fast_gas_price: (previous.fast_gas_price + jitter(rng, FAST_GAS_JITTER)).max(0.0),
            congestion: Congestion::ALL[rng.gen_range(0..Congestion::ALL.len())],
            avg_block_time: BASE_BLOCK_TIME_SECS + jitter(rng, BLOCK_TIME_JITTER),
        });

        debug!(
            "Network stats: base {:.2} gwei, fast {:.2} gwei, congestion {}, block {:.1}s",
            next.base_fee, next.fast_gas_price, next.congestion, next.avg_block_time
        );

        self.set(next.clone());
        next
    }
}

impl Default for NetworkStatsMonitor {
    fn default() -> Self {
        Self::new(NetworkStats::default(), SimRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_stays_within_jitter_bounds() {
        let monitor = NetworkStatsMonitor::new(NetworkStats::default(), SimRng::seeded(7));
        for _ in 0..200 {
            let before = monitor.snapshot();
            let after = monitor.update();
            assert!((after.base_fee - before.base_fee).abs() <= BASE_FEE_JITTER);
            assert!((after.fast_gas_price - before.fast_gas_price).abs() <= FAST_GAS_JITTER);
            assert!(after.avg_block_time >= 10.0 && after.avg_block_time <= 14.0);
            assert!(after.base_fee >= 0.0 && after.fast_gas_price >= 0.0);
        }
    }

    #[test]
    fn test_fees_never_negative() {
        let monitor = NetworkStatsMonitor::new(
            NetworkStats {
                base_fee: 0.5,
                fast_gas_price: 0.5,
                ..NetworkStats::default()
            },
            SimRng::seeded(11),
        );
        for _ in 0..500 {
            let stats = monitor.update();
            assert!(stats.base_fee >= 0.0);
            assert!(stats.fast_gas_price >= 0.0);
        }
    }

    #[test]
    fn test_congestion_visits_all_levels() {
        let monitor = NetworkStatsMonitor::new(NetworkStats::default(), SimRng::seeded(3));
        let seen: std::collections::HashSet<_> =
            (0..100).map(|_| monitor.update().congestion).collect();
        assert_eq!(seen.len(), 3);
    }
}

//! Market data source. The random walk stands in for a live price feed.

use crate::rng::{jitter, uniform, SimRng};
use chrono::Utc;
use rand::Rng;
use snipebot_core::{MarketConditions, MarketData, TokenAddress};

/// Supplies price samples and order-book conditions per token
pub trait MarketOracle: Send + Sync {
    /// Next snapshot for `token`. `previous` is the last snapshot the engine holds.
    fn sample(&self, token: &TokenAddress, previous: Option<&MarketData>) -> MarketData;

    /// Liquidity / volatility / volume reading used for slippage sizing
    fn conditions(&self, token: &TokenAddress) -> MarketConditions;
}

/// Random-walk oracle: ±5% per tick around the previous price
pub struct RandomWalkOracle {
    rng: SimRng,
}

impl RandomWalkOracle {
    pub fn new(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl Default for RandomWalkOracle {
    fn default() -> Self {
        Self::new(SimRng::from_entropy())
    }
}

impl MarketOracle for RandomWalkOracle {
    fn sample(&self, token: &TokenAddress, previous: Option<&MarketData>) -> MarketData {
        let now = Utc::now();
        // Timestamps never go backwards for a token
        let timestamp = match previous {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        self.rng.with(|rng| {
            let base_price = match previous {
                Some(prev) if prev.price > 0.0 => prev.price,
                _ => uniform(rng, 0.0001, 0.0011),
            };

            MarketData {
                token_address: token.clone(),
                price: (base_price * (1.0 + jitter(rng, 0.05))).max(0.0),
                price_change_1m: jitter(rng, 2.5),
                price_change_5m: jitter(rng, 7.5),
                price_change_1h: jitter(rng, 15.0),
                volume_1h: uniform(rng, 0.0, 1_000_000.0),
                liquidity: uniform(rng, 0.0, 5_000_000.0),
                holders: rng.gen_range(100..10_100),
                timestamp,
            }
        })
    }

    fn conditions(&self, _token: &TokenAddress) -> MarketConditions {
        self.rng.with(|rng| MarketConditions {
            liquidity: uniform(rng, 100_000.0, 5_100_000.0),
            volatility: uniform(rng, 5.0, 55.0),
            volume_24h: uniform(rng, 10_000.0, 1_010_000.0),
        })
    }
}

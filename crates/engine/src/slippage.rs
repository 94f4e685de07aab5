//! Smart slippage sizing from liquidity, volatility and volume

use crate::oracle::MarketOracle;
use crate::rng::{uniform, SimRng};
use crate::store::EstimateStore;
use snipebot_core::{MarketConditions, SlippageCalculation, SlippageParams, TokenAddress};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Volume at which the volume factor is neutral (USD)
const REFERENCE_VOLUME: f64 = 500_000.0;
/// Volatility at which the volatility factor is neutral (percent)
const REFERENCE_VOLATILITY: f64 = 20.0;

fn bounded(value: f64, min: f64, max: f64) -> f64 {
    f64::max(min, f64::min(max, value))
}

/// Pure slippage computation for a given market reading
pub fn compute_slippage(
    params: &SlippageParams,
    conditions: &MarketConditions,
    confidence: f64,
) -> SlippageCalculation {
    let liquidity_factor = if conditions.liquidity > 0.0 {
        bounded(params.liquidity_threshold / conditions.liquidity, 0.5, 2.0)
    } else {
        2.0
    };
    let volatility_factor = bounded(conditions.volatility / REFERENCE_VOLATILITY, 0.5, 3.0);
    let volume_factor = bounded(conditions.volume_24h / REFERENCE_VOLUME, 0.8, 1.5);

    let adjusted_slippage = params.base_slippage
        * liquidity_factor
        * volatility_factor
        * volume_factor
        * params.volatility_multiplier;

    // Upper bound applied last, so max_slippage wins if the bounds cross
    let recommended_slippage = f64::min(
        params.max_slippage,
        f64::max(params.base_slippage * 0.5, adjusted_slippage),
    );

    SlippageCalculation {
        base_slippage: params.base_slippage,
        adjusted_slippage,
        liquidity_factor,
        volatility_factor,
        recommended_slippage,
        confidence,
    }
}

/// Slippage model keyed by token; the latest calculation per token is retained
pub struct SlippageModel {
    oracle: Arc<dyn MarketOracle>,
    calculations: EstimateStore<SlippageCalculation>,
    rng: SimRng,
}

impl SlippageModel {
    pub fn new(oracle: Arc<dyn MarketOracle>, rng: SimRng, capacity: usize) -> Self {
        Self {
            oracle,
            calculations: EstimateStore::with_capacity(capacity),
            rng,
        }
    }

    /// Read market conditions for `token` and size the slippage
    pub fn calculate_smart_slippage(
        &self,
        token: &TokenAddress,
        params: &SlippageParams,
    ) -> SlippageCalculation {
        let conditions = self.oracle.conditions(token);
        let confidence = self.rng.with(|rng| uniform(rng, 0.6, 1.0));
        let calculation = compute_slippage(params, &conditions, confidence);

        debug!(
            "Slippage for {}: liquidity ${:.0}, volatility {:.1}%, adjusted {:.2}%, recommended {:.2}%",
            token.short(),
            conditions.liquidity,
            conditions.volatility,
            calculation.adjusted_slippage,
            calculation.recommended_slippage
        );

        self.calculations.insert(token.clone(), calculation.clone());
        calculation
    }

    pub fn latest(&self, token: &TokenAddress) -> Option<SlippageCalculation> {
        self.calculations.get(token)
    }

    pub fn calculations(&self) -> HashMap<TokenAddress, SlippageCalculation> {
        self.calculations.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::RandomWalkOracle;

    fn params(base: f64, max: f64) -> SlippageParams {
        SlippageParams {
            base_slippage: base,
            max_slippage: max,
            liquidity_threshold: 100_000.0,
            volatility_multiplier: 1.5,
        }
    }

    #[test]
    fn test_factor_clamping() {
        let calc = compute_slippage(
            &params(10.0, 25.0),
            &MarketConditions {
                liquidity: 10_000_000.0,
                volatility: 100.0,
                volume_24h: 5_000.0,
            },
            0.9,
        );
        assert_eq!(calc.liquidity_factor, 0.5);
        assert_eq!(calc.volatility_factor, 3.0);
        // 10 * 0.5 * 3 * 0.8 * 1.5
        assert!((calc.adjusted_slippage - 18.0).abs() < 1e-9);
        assert!((calc.recommended_slippage - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_recommendation_clamped_to_max() {
        let calc = compute_slippage(
            &params(12.0, 25.0),
            &MarketConditions {
                liquidity: 50_000.0,
                volatility: 60.0,
                volume_24h: 1_000_000.0,
            },
            0.9,
        );
        assert_eq!(calc.recommended_slippage, 25.0);
        assert!(calc.adjusted_slippage > 25.0);
    }

    #[test]
    fn test_recommendation_clamped_to_half_base() {
        let mut p = params(10.0, 25.0);
        p.volatility_multiplier = 0.1;
        let calc = compute_slippage(
            &p,
            &MarketConditions {
                liquidity: 5_000_000.0,
                volatility: 5.0,
                volume_24h: 10_000.0,
            },
            0.9,
        );
        assert_eq!(calc.recommended_slippage, 5.0);
    }

    #[test]
    fn test_recommended_always_within_bounds() {
        let oracle: Arc<dyn MarketOracle> = Arc::new(RandomWalkOracle::new(SimRng::seeded(4)));
        let model = SlippageModel::new(oracle, SimRng::seeded(8), 8);
        let token = TokenAddress::parse("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984").unwrap();

        for (base, max, mult) in [(1.0, 2.0, 0.1), (10.0, 25.0, 1.5), (12.0, 12.0, 5.0), (0.5, 50.0, 2.0)] {
            let p = SlippageParams {
                base_slippage: base,
                max_slippage: max,
                liquidity_threshold: 250_000.0,
                volatility_multiplier: mult,
            };
            for _ in 0..100 {
                let calc = model.calculate_smart_slippage(&token, &p);
                assert!(calc.recommended_slippage >= base * 0.5 - 1e-12);
                assert!(calc.recommended_slippage <= max + 1e-12);
                assert!(calc.confidence >= 0.6 && calc.confidence < 1.0);
            }
        }
        assert!(model.latest(&token).is_some());
        assert_eq!(model.calculations().len(), 1);
    }
}

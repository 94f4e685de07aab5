//! Slippage sizing models

use crate::models::SlippageSettings;
use serde::{Deserialize, Serialize};

/// Inputs to a smart slippage calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlippageParams {
    pub base_slippage: f64,
    pub max_slippage: f64,
    pub liquidity_threshold: f64,
    pub volatility_multiplier: f64,
}

impl From<&SlippageSettings> for SlippageParams {
    fn from(settings: &SlippageSettings) -> Self {
        Self {
            base_slippage: settings.base_slippage,
            max_slippage: settings.max_slippage,
            liquidity_threshold: settings.liquidity_threshold,
            volatility_multiplier: settings.volatility_multiplier,
        }
    }
}

/// Result of a smart slippage calculation. All slippages in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlippageCalculation {
    pub base_slippage: f64,
    pub adjusted_slippage: f64,
    pub liquidity_factor: f64,
    pub volatility_factor: f64,
    /// Clamped to `[base_slippage * 0.5, max_slippage]`
    pub recommended_slippage: f64,
    /// 0..1
    pub confidence: f64,
}

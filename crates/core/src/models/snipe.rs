//! Snipe configuration: the trading rules a user sets up

use crate::errors::{Error, Result};
use crate::types::TokenAddress;
use serde::{Deserialize, Serialize};

/// Hard ceiling on gas-settings retry count
pub const MAX_RETRY_COUNT: u8 = 5;

/// Gas pricing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasMode {
    Auto,
    Manual,
}

/// Slippage mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlippageMode {
    Fixed,
    Adaptive,
}

/// Nonce assignment mode for batched sniping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceMode {
    Auto,
    Manual,
}

/// Gas policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasSettings {
    pub mode: GasMode,
    /// Ceiling in gwei
    pub max_gas_price: f64,
    /// Priority tip in gwei
    pub priority_fee: f64,
    /// Seconds before an execution is abandoned
    pub execution_timeout: u64,
    /// 0..=5
    pub retry_count: u8,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            mode: GasMode::Auto,
            max_gas_price: 100.0,
            priority_fee: 2.0,
            execution_timeout: 120,
            retry_count: 3,
        }
    }
}

/// Slippage policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlippageSettings {
    pub mode: SlippageMode,
    pub base_slippage: f64,
    pub max_slippage: f64,
    /// Pool liquidity (USD) below which slippage is widened
    pub liquidity_threshold: f64,
    /// 0.1..=5
    pub volatility_multiplier: f64,
}

impl Default for SlippageSettings {
    fn default() -> Self {
        Self {
            mode: SlippageMode::Adaptive,
            base_slippage: 10.0,
            max_slippage: 25.0,
            liquidity_threshold: 100_000.0,
            volatility_multiplier: 1.5,
        }
    }
}

/// Trailing stop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingStop {
    pub enabled: bool,
    /// Trail distance below the peak, in percent
    pub percentage: f64,
    /// Profit percent at which the trail arms
    pub activation_price: f64,
}

impl Default for TrailingStop {
    fn default() -> Self {
        Self {
            enabled: false,
            percentage: 5.0,
            activation_price: 20.0,
        }
    }
}

/// Partial selling ladder. `percentages[i]` is sold when profit reaches `price_targets[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSelling {
    pub enabled: bool,
    pub percentages: Vec<f64>,
    pub price_targets: Vec<f64>,
}

impl PartialSelling {
    /// Sell fraction used when a target has no matching percentage entry
    pub const DEFAULT_PERCENTAGE: f64 = 25.0;

    /// `(price_target, percentage)` pairs in configured order
    pub fn ladder(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.price_targets.iter().enumerate().map(|(i, target)| {
            let pct = self
                .percentages
                .get(i)
                .copied()
                .filter(|p| *p > 0.0)
                .unwrap_or(Self::DEFAULT_PERCENTAGE);
            (*target, pct)
        })
    }
}

impl Default for PartialSelling {
    fn default() -> Self {
        Self {
            enabled: false,
            percentages: vec![25.0, 50.0],
            price_targets: vec![20.0, 50.0],
        }
    }
}

/// Exit policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSell {
    pub enabled: bool,
    /// Take-profit threshold in percent
    pub profit_target: f64,
    /// Stop-loss threshold in percent, negative
    pub stop_loss: f64,
    pub trailing_stop: TrailingStop,
    pub partial_selling: PartialSelling,
}

impl Default for AutoSell {
    fn default() -> Self {
        Self {
            enabled: false,
            profit_target: 50.0,
            stop_loss: -20.0,
            trailing_stop: TrailingStop::default(),
            partial_selling: PartialSelling::default(),
        }
    }
}

/// Batch sniping policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSettings {
    pub enabled: bool,
    /// 1..=10
    pub max_batch_size: u8,
    /// Milliseconds between transactions
    pub batch_delay: u64,
    pub nonce_management: NonceMode,
    /// 1..=10, higher goes first
    pub priority: u8,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_batch_size: 3,
            batch_delay: 200,
            nonce_management: NonceMode::Auto,
            priority: 5,
        }
    }
}

/// A user-defined snipe rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnipeConfig {
    pub id: String,
    pub token_address: TokenAddress,
    pub target_price: f64,
    pub max_price: f64,
    /// Native currency to spend per snipe
    pub amount: f64,
    /// Slippage tolerance in percent
    pub slippage: f64,
    pub gas_price: f64,
    pub max_gas: u64,
    pub enabled: bool,
    pub gas_settings: GasSettings,
    pub slippage_settings: SlippageSettings,
    #[serde(default)]
    pub auto_sell: Option<AutoSell>,
    pub batch_settings: BatchSettings,
}

impl SnipeConfig {
    /// Build a disabled config from a draft under a fresh id
    pub fn from_draft(id: String, draft: NewSnipeConfig) -> Self {
        Self {
            id,
            token_address: draft.token_address,
            target_price: draft.target_price,
            max_price: draft.max_price,
            amount: draft.amount,
            slippage: draft.slippage,
            gas_price: draft.gas_price,
            max_gas: draft.max_gas,
            enabled: false,
            gas_settings: draft.gas_settings,
            slippage_settings: draft.slippage_settings,
            auto_sell: draft.auto_sell,
            batch_settings: draft.batch_settings,
        }
    }

    /// Auto-sell policy, only when switched on
    pub fn active_auto_sell(&self) -> Option<&AutoSell> {
        self.auto_sell.as_ref().filter(|a| a.enabled)
    }

    /// Shallow-merge a partial update. Nested settings are replaced whole.
    pub fn apply(&mut self, patch: SnipeConfigPatch) {
        if let Some(v) = patch.token_address {
            self.token_address = v;
        }
        if let Some(v) = patch.target_price {
            self.target_price = v;
        }
        if let Some(v) = patch.max_price {
            self.max_price = v;
        }
        if let Some(v) = patch.amount {
            self.amount = v;
        }
        if let Some(v) = patch.slippage {
            self.slippage = v;
        }
        if let Some(v) = patch.gas_price {
            self.gas_price = v;
        }
        if let Some(v) = patch.max_gas {
            self.max_gas = v;
        }
        if let Some(v) = patch.gas_settings {
            self.gas_settings = v;
        }
        if let Some(v) = patch.slippage_settings {
            self.slippage_settings = v;
        }
        if let Some(v) = patch.auto_sell {
            self.auto_sell = v;
        }
        if let Some(v) = patch.batch_settings {
            self.batch_settings = v;
        }
    }

    /// Range checks on the policy fields. Price relations are an enable-time concern.
    pub fn validate_fields(&self) -> Result<()> {
        validate_policies(
            &self.gas_settings,
            &self.slippage_settings,
            self.auto_sell.as_ref(),
            &self.batch_settings,
        )
    }
}

/// A snipe config as submitted by the user, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnipeConfig {
    pub token_address: TokenAddress,
    #[serde(default = "default_target_price")]
    pub target_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    #[serde(default = "default_amount")]
    pub amount: f64,
    #[serde(default = "default_slippage")]
    pub slippage: f64,
    #[serde(default = "default_gas_price")]
    pub gas_price: f64,
    #[serde(default = "default_max_gas")]
    pub max_gas: u64,
    #[serde(default)]
    pub gas_settings: GasSettings,
    #[serde(default)]
    pub slippage_settings: SlippageSettings,
    #[serde(default)]
    pub auto_sell: Option<AutoSell>,
    #[serde(default)]
    pub batch_settings: BatchSettings,
}

fn default_target_price() -> f64 { 0.00001 }
fn default_max_price() -> f64 { 0.00002 }
fn default_amount() -> f64 { 0.1 }
fn default_slippage() -> f64 { 10.0 }
fn default_gas_price() -> f64 { 20.0 }
fn default_max_gas() -> u64 { 500_000 }

impl NewSnipeConfig {
    /// Draft with form defaults for the given token
    pub fn for_token(token_address: TokenAddress) -> Self {
        Self {
            token_address,
            target_price: default_target_price(),
            max_price: default_max_price(),
            amount: default_amount(),
            slippage: default_slippage(),
            gas_price: default_gas_price(),
            max_gas: default_max_gas(),
            gas_settings: GasSettings::default(),
            slippage_settings: SlippageSettings::default(),
            auto_sell: Some(AutoSell::default()),
            batch_settings: BatchSettings::default(),
        }
    }

    pub fn validate_fields(&self) -> Result<()> {
        validate_policies(
            &self.gas_settings,
            &self.slippage_settings,
            self.auto_sell.as_ref(),
            &self.batch_settings,
        )
    }
}

/// Partial update for [`SnipeConfig`]. `None` leaves a field untouched.
///
/// Identity and the enabled flag are not patchable; enabling goes through the
/// store's enable check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnipeConfigPatch {
    pub token_address: Option<TokenAddress>,
    pub target_price: Option<f64>,
    pub max_price: Option<f64>,
    pub amount: Option<f64>,
    pub slippage: Option<f64>,
    pub gas_price: Option<f64>,
    pub max_gas: Option<u64>,
    pub gas_settings: Option<GasSettings>,
    pub slippage_settings: Option<SlippageSettings>,
    /// `Some(None)` clears the exit policy
    pub auto_sell: Option<Option<AutoSell>>,
    pub batch_settings: Option<BatchSettings>,
}

fn validate_policies(
    gas: &GasSettings,
    slippage: &SlippageSettings,
    auto_sell: Option<&AutoSell>,
    batch: &BatchSettings,
) -> Result<()> {
    if gas.retry_count > MAX_RETRY_COUNT {
        return Err(Error::validation(
            "retryCount",
            format!("must be between 0 and {}, got {}", MAX_RETRY_COUNT, gas.retry_count),
        ));
    }
    if gas.max_gas_price < 0.0 || gas.priority_fee < 0.0 {
        return Err(Error::validation("gasSettings", "fees cannot be negative"));
    }

    if !(0.1..=5.0).contains(&slippage.volatility_multiplier) {
        return Err(Error::validation(
            "volatilityMultiplier",
            format!("must be between 0.1 and 5, got {}", slippage.volatility_multiplier),
        ));
    }
    if slippage.base_slippage <= 0.0 {
        return Err(Error::validation("baseSlippage", "must be positive"));
    }
    if slippage.max_slippage < slippage.base_slippage {
        return Err(Error::validation(
            "maxSlippage",
            format!(
                "must be >= base slippage ({} < {})",
                slippage.max_slippage, slippage.base_slippage
            ),
        ));
    }
    if slippage.liquidity_threshold < 0.0 {
        return Err(Error::validation("liquidityThreshold", "cannot be negative"));
    }

    if !(1..=10).contains(&batch.max_batch_size) {
        return Err(Error::validation(
            "maxBatchSize",
            format!("must be between 1 and 10, got {}", batch.max_batch_size),
        ));
    }
    if !(1..=10).contains(&batch.priority) {
        return Err(Error::validation(
            "priority",
            format!("must be between 1 and 10, got {}", batch.priority),
        ));
    }

    if let Some(auto_sell) = auto_sell {
        if auto_sell.stop_loss >= 0.0 {
            return Err(Error::validation(
                "stopLoss",
                format!("must be negative, got {}", auto_sell.stop_loss),
            ));
        }
        if auto_sell.profit_target <= 0.0 {
            return Err(Error::validation("profitTarget", "must be positive"));
        }
        let trail = auto_sell.trailing_stop.percentage;
        if auto_sell.trailing_stop.enabled && !(trail > 0.0 && trail < 100.0) {
            return Err(Error::validation(
                "trailingStop",
                format!("percentage must be in (0, 100), got {}", trail),
            ));
        }
        if auto_sell
            .partial_selling
            .percentages
            .iter()
            .any(|p| !(*p > 0.0 && *p <= 100.0))
        {
            return Err(Error::validation(
                "partialSelling",
                "percentages must be in (0, 100]",
            ));
        }
    }

    Ok(())
}

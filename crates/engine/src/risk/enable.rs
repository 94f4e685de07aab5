//! Pre-flight check run before a snipe config may trade

use snipebot_core::{Error, SnipeConfig};
use thiserror::Error;

/// Largest trade amount accepted, in native units
pub const MAX_TRADE_AMOUNT: f64 = 10.0;

/// Largest slippage tolerance accepted, in percent
pub const MAX_SLIPPAGE: f64 = 50.0;

/// First rule a config failed. The message is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnableViolation {
    #[error("Please set a target price")]
    MissingTargetPrice,

    #[error("Please set a maximum price")]
    MissingMaxPrice,

    #[error("Max price must be >= target price")]
    MaxBelowTarget { target: f64, max: f64 },

    #[error("Please set an amount to trade")]
    MissingAmount,

    #[error("Amount seems too high (>10 ETH)")]
    AmountTooHigh { requested: f64 },

    #[error("Please set slippage tolerance")]
    MissingSlippage,

    #[error("Slippage seems too high (>50%)")]
    SlippageTooHigh { requested: f64 },

    #[error("Please confirm your settings below")]
    NotAcknowledged,
}

impl From<EnableViolation> for Error {
    fn from(v: EnableViolation) -> Self {
        Error::EnableRejected(v.to_string())
    }
}

/// Check whether a config may be switched on.
///
/// Rules run in a fixed order and the first failure is returned:
/// target price set, max price set, max >= target, amount set, amount within
/// `MAX_TRADE_AMOUNT`, slippage set, slippage within `MAX_SLIPPAGE`, then the
/// risk acknowledgement. The price relation comes before amount and slippage,
/// so an inverted price range is reported whatever else is missing.
/// Pure: same inputs, same answer.
pub fn check_enable_allowed(config: &SnipeConfig, acknowledged: bool) -> Result<(), EnableViolation> {
    if !(config.target_price > 0.0) {
        return Err(EnableViolation::MissingTargetPrice);
    }

    if !(config.max_price > 0.0) {
        return Err(EnableViolation::MissingMaxPrice);
    }

    if config.max_price < config.target_price {
        return Err(EnableViolation::MaxBelowTarget {
            target: config.target_price,
            max: config.max_price,
        });
    }

    if !(config.amount > 0.0) {
        return Err(EnableViolation::MissingAmount);
    }

    if config.amount > MAX_TRADE_AMOUNT {
        return Err(EnableViolation::AmountTooHigh {
            requested: config.amount,
        });
    }

    if !(config.slippage > 0.0) {
        return Err(EnableViolation::MissingSlippage);
    }

    if config.slippage > MAX_SLIPPAGE {
        return Err(EnableViolation::SlippageTooHigh {
            requested: config.slippage,
        });
    }

    if !acknowledged {
        return Err(EnableViolation::NotAcknowledged);
    }

    Ok(())
}

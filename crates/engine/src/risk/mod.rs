//! Risk controls gating live trading

mod enable;

pub use enable::{check_enable_allowed, EnableViolation, MAX_SLIPPAGE, MAX_TRADE_AMOUNT};

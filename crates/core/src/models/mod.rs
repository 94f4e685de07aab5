//! Data models for snipe bot entities

mod gas;
mod market;
mod queue;
mod slippage;
mod snipe;
mod status;
mod trade;

pub use gas::*;
pub use market::*;
pub use queue::*;
pub use slippage::*;
pub use snipe::*;
pub use status::*;
pub use trade::*;

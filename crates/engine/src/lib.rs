//! SnipeBot Engine - market simulation, strategies, transaction queue and risk checks

pub mod config;
pub mod configs;
pub mod demo;
pub mod engine;
pub mod executor;
pub mod gas;
pub mod ledger;
pub mod network;
pub mod oracle;
pub mod risk;
pub mod rng;
pub mod slippage;
pub mod store;
pub mod strategies;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EngineConfig, QueueSettings, SimulationSettings};
pub use configs::SnipeConfigStore;
pub use engine::{SnipeEngine, TickReport};
pub use executor::{BatchReport, Broadcaster, QueueEvent, QueueProcessor, SimulatedBroadcaster, TransactionQueue};
pub use gas::GasModel;
pub use ledger::{LedgerStats, TransactionLedger};
pub use network::NetworkStatsMonitor;
pub use oracle::{MarketOracle, RandomWalkOracle};
pub use slippage::SlippageModel;
pub use strategies::evaluate_exit;

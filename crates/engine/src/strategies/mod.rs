//! Trading strategies: entry signal, exit evaluation and position tracking

mod exit;
mod positions;
mod sniper;

pub use exit::{evaluate_exit, exit_priority, ExitPlan, URGENT_EXIT_PRIORITY};
pub use positions::{OpenPosition, PendingExit, PositionBook};
pub use sniper::entry_signal;

//! Transaction queue, broadcaster seam, and the batch processor that drains it

mod broadcaster;
mod processor;
mod queue;

pub use broadcaster::{Broadcaster, SimulatedBroadcaster};
pub use processor::{BatchReport, QueueEvent, QueueProcessor};
pub use queue::{FailureOutcome, QueueOrder, SharedQueue, TransactionQueue};

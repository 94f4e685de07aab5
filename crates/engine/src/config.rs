//! Engine tunables

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue draining and retry behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueSettings {
    /// Items drained per processing run
    pub batch_size: usize,
    /// Failed -> queued transitions allowed per item
    pub max_retries: u32,
    /// Cool-down before a failed item is re-queued
    pub retry_cooldown_ms: u64,
    /// Gap between items of the same batch
    pub batch_pacing_ms: u64,
    /// Items older than this are purged regardless of status
    pub retention_secs: u64,
    /// Capacity of the queue event channel
    pub event_buffer: usize,
}

impl QueueSettings {
    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_millis(self.retry_cooldown_ms)
    }

    pub fn batch_pacing(&self) -> Duration {
        Duration::from_millis(self.batch_pacing_ms)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.retention_secs as i64)
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_retries: 3,
            retry_cooldown_ms: 5_000,
            batch_pacing_ms: 200,
            retention_secs: 300,
            event_buffer: 256,
        }
    }
}

/// Knobs for the simulated broadcaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationSettings {
    pub execution_latency_min_ms: u64,
    pub execution_latency_max_ms: u64,
    /// Probability an execution is accepted (0..1)
    pub execution_success_rate: f64,
    pub confirmation_delay_min_ms: u64,
    pub confirmation_delay_max_ms: u64,
    /// Probability an accepted transaction settles successfully (0..1)
    pub confirmation_success_rate: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            execution_latency_min_ms: 1_000,
            execution_latency_max_ms: 3_000,
            execution_success_rate: 0.9,
            confirmation_delay_min_ms: 2_000,
            confirmation_delay_max_ms: 5_000,
            confirmation_success_rate: 0.9,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub queue: QueueSettings,
    pub simulation: SimulationSettings,
    /// Max tokens kept in each gas/slippage estimate store
    pub estimate_store_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue: QueueSettings::default(),
            simulation: SimulationSettings::default(),
            estimate_store_capacity: 500,
        }
    }
}

//! Execution backend seam. The simulated broadcaster stands in for RPC submission.

use crate::config::SimulationSettings;
use crate::rng::SimRng;
use async_trait::async_trait;
use rand::Rng;
use snipebot_core::{Error, ExecutionReceipt, ExecutionRequest, Result};
use std::time::Duration;
use tracing::debug;

/// Submits queue items to the network and reports settlement
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Broadcast one request. `Err` is a transient failure the queue may retry.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt>;

    /// Wait for the transaction with `hash` to settle; `true` if it succeeded
    async fn confirm(&self, hash: &str) -> bool;
}

/// Latency and outcomes drawn at random from [`SimulationSettings`]
pub struct SimulatedBroadcaster {
    settings: SimulationSettings,
    rng: SimRng,
}

impl SimulatedBroadcaster {
    pub fn new(settings: SimulationSettings, rng: SimRng) -> Self {
        Self { settings, rng }
    }

    fn delay_between(&self, min_ms: u64, max_ms: u64) -> Duration {
        let ms = if max_ms > min_ms {
            self.rng.with(|rng| rng.gen_range(min_ms..max_ms))
        } else {
            min_ms
        };
        Duration::from_millis(ms)
    }

    fn roll(&self, success_rate: f64) -> bool {
        let p = success_rate.clamp(0.0, 1.0);
        self.rng.with(|rng| rng.gen_bool(p))
    }

    fn random_hash(&self) -> String {
        let bytes: [u8; 32] = self.rng.with(|rng| rng.gen());
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!("0x{}", hex)
    }
}

#[async_trait]
impl Broadcaster for SimulatedBroadcaster {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt> {
        let latency = self.delay_between(
            self.settings.execution_latency_min_ms,
            self.settings.execution_latency_max_ms,
        );
        let accepted = self.roll(self.settings.execution_success_rate);

        tokio::time::sleep(latency).await;

        if !accepted {
            return Err(Error::Execution(format!(
                "simulated broadcast rejected for nonce {} after {}ms",
                request.nonce,
                latency.as_millis()
            )));
        }

        let receipt = ExecutionReceipt {
            hash: self.random_hash(),
            gas_used: self.rng.with(|rng| rng.gen_range(21_000..121_000)),
            gas_price: request.gas_settings.max_fee_per_gas,
        };
        debug!(
            "Broadcast {} {} to {} (nonce {}) -> {}",
            request.trade_type,
            request.amount,
            request.to.short(),
            request.nonce,
            receipt.hash
        );
        Ok(receipt)
    }

    async fn confirm(&self, hash: &str) -> bool {
        let delay = self.delay_between(
            self.settings.confirmation_delay_min_ms,
            self.settings.confirmation_delay_max_ms,
        );
        let settled = self.roll(self.settings.confirmation_success_rate);

        tokio::time::sleep(delay).await;
        debug!("Confirmation for {}: {}", hash, if settled { "success" } else { "failed" });
        settled
    }
}

//! Scripted collaborators for unit tests

use crate::executor::Broadcaster;
use crate::oracle::MarketOracle;
use async_trait::async_trait;
use chrono::Utc;
use snipebot_core::{
    Error, ExecutionReceipt, ExecutionRequest, MarketConditions, MarketData, Result, TokenAddress,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Broadcaster with scripted outcomes and a fixed latency; records requests in call order.
/// Executions succeed once the script runs out. Confirmations always settle.
pub(crate) struct ScriptedBroadcaster {
    outcomes: Mutex<VecDeque<bool>>,
    latency: Duration,
    requests: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedBroadcaster {
    pub(crate) fn new(outcomes: &[bool], latency_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            latency: Duration::from_millis(latency_ms),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Nonces in execution order
    pub(crate) fn calls(&self) -> Vec<u64> {
        self.requests.lock().unwrap().iter().map(|r| r.nonce).collect()
    }

    pub(crate) fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for ScriptedBroadcaster {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt> {
        self.requests.lock().unwrap().push(request.clone());
        let ok = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
        tokio::time::sleep(self.latency).await;
        if ok {
            Ok(ExecutionReceipt {
                hash: format!("0x{:064x}", request.nonce),
                gas_used: 21_000,
                gas_price: request.gas_settings.max_fee_per_gas,
            })
        } else {
            Err(Error::Execution("scripted failure".to_string()))
        }
    }

    async fn confirm(&self, _hash: &str) -> bool {
        true
    }
}

/// Oracle returning whatever price the test last set for a token
#[derive(Default)]
pub(crate) struct ScriptedOracle {
    prices: Mutex<HashMap<TokenAddress, f64>>,
}

impl ScriptedOracle {
    pub(crate) fn set_price(&self, token: &TokenAddress, price: f64) {
        self.prices.lock().unwrap().insert(token.clone(), price);
    }
}

impl MarketOracle for ScriptedOracle {
    fn sample(&self, token: &TokenAddress, _previous: Option<&MarketData>) -> MarketData {
        let price = self.prices.lock().unwrap().get(token).copied().unwrap_or(1.0);
        MarketData {
            token_address: token.clone(),
            price,
            price_change_1m: 0.0,
            price_change_5m: 0.0,
            price_change_1h: 0.0,
            volume_1h: 0.0,
            liquidity: 1_000_000.0,
            holders: 1_000,
            timestamp: Utc::now(),
        }
    }

    fn conditions(&self, _token: &TokenAddress) -> MarketConditions {
        MarketConditions {
            liquidity: 1_000_000.0,
            volatility: 20.0,
            volume_24h: 500_000.0,
        }
    }
}

//! SnipeEngine - wires market data, strategies and the transaction queue per tick

use crate::config::EngineConfig;
use crate::configs::SnipeConfigStore;
use crate::executor::{
    BatchReport, Broadcaster, QueueEvent, QueueOrder, QueueProcessor, SharedQueue,
    SimulatedBroadcaster, TransactionQueue,
};
use crate::gas::{max_fee_for, GasModel};
use crate::ledger::{LedgerStats, PendingTransaction, TransactionLedger};
use crate::network::NetworkStatsMonitor;
use crate::oracle::{MarketOracle, RandomWalkOracle};
use crate::rng::SimRng;
use crate::slippage::SlippageModel;
use crate::strategies::{entry_signal, exit_priority, OpenPosition, PendingExit, PositionBook};
use chrono::Utc;
use snipebot_core::{
    BotStatus, ExecutionReceipt, GasEstimation, GasSnapshot, MarketData, NetworkStats,
    NewSnipeConfig, QueueStatus, Result, SlippageCalculation, SlippageMode, SlippageParams,
    SnipeConfig, SnipeConfigPatch, TokenAddress, TradeType, Transaction, TransactionQueueItem,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What a queued item is meant to do once it executes
#[derive(Debug, Clone)]
struct TradeIntent {
    config_id: String,
    token_address: TokenAddress,
    trade_type: TradeType,
    /// Buy: native amount. Sell: token quantity.
    amount: f64,
    /// Market price when the order was queued
    price: f64,
    ladder_index: Option<usize>,
    /// Set once a confirmation event has been picked up
    settling: bool,
}

/// Counts from one market tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sampled: usize,
    pub buys_queued: usize,
    pub sells_queued: usize,
}

/// Main engine. Shared behind an `Arc`; every method takes `&self`.
///
/// Lock order when more than one is held: positions, intents, queue.
pub struct SnipeEngine {
    configs: RwLock<SnipeConfigStore>,
    market: RwLock<HashMap<TokenAddress, MarketData>>,
    positions: RwLock<PositionBook>,
    intents: RwLock<HashMap<String, TradeIntent>>,
    ledger: RwLock<TransactionLedger>,
    network: Arc<NetworkStatsMonitor>,
    gas: GasModel,
    slippage: SlippageModel,
    oracle: Arc<dyn MarketOracle>,
    broadcaster: Arc<dyn Broadcaster>,
    processor: QueueProcessor,
    running: AtomicBool,
    started_at: RwLock<Option<Instant>>,
}

impl SnipeEngine {
    /// Build an engine over the given collaborators. `seed` makes the
    /// gas, slippage and network draws reproducible.
    pub fn new(
        config: EngineConfig,
        oracle: Arc<dyn MarketOracle>,
        broadcaster: Arc<dyn Broadcaster>,
        seed: Option<u64>,
    ) -> Self {
        let rng = |stream: u64| match seed {
            Some(seed) => SimRng::seeded(seed.wrapping_add(stream)),
            None => SimRng::from_entropy(),
        };

        let network = Arc::new(NetworkStatsMonitor::new(NetworkStats::default(), rng(1)));
        let gas = GasModel::new(network.clone(), rng(2), config.estimate_store_capacity);
        let slippage = SlippageModel::new(oracle.clone(), rng(3), config.estimate_store_capacity);

        let queue: SharedQueue = Arc::new(RwLock::new(TransactionQueue::new(config.queue.retention())));
        let processor = QueueProcessor::new(queue, broadcaster.clone(), config.queue.clone());

        Self {
            configs: RwLock::new(SnipeConfigStore::new()),
            market: RwLock::new(HashMap::new()),
            positions: RwLock::new(PositionBook::new()),
            intents: RwLock::new(HashMap::new()),
            ledger: RwLock::new(TransactionLedger::new()),
            network,
            gas,
            slippage,
            oracle,
            broadcaster,
            processor,
            running: AtomicBool::new(false),
            started_at: RwLock::new(None),
        }
    }

    /// Fully simulated engine: random-walk prices and a probabilistic broadcaster
    pub fn simulated(config: EngineConfig) -> Self {
        let oracle = Arc::new(RandomWalkOracle::new(SimRng::from_entropy()));
        let broadcaster = Arc::new(SimulatedBroadcaster::new(
            config.simulation.clone(),
            SimRng::from_entropy(),
        ));
        Self::new(config, oracle, broadcaster, None)
    }

    /// Simulated engine with every random source derived from `seed`
    pub fn seeded(config: EngineConfig, seed: u64) -> Self {
        let oracle = Arc::new(RandomWalkOracle::new(SimRng::seeded(seed)));
        let broadcaster = Arc::new(SimulatedBroadcaster::new(
            config.simulation.clone(),
            SimRng::seeded(seed.wrapping_add(4)),
        ));
        Self::new(config, oracle, broadcaster, Some(seed))
    }

    // ---- lifecycle ----

    pub async fn start(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            *self.started_at.write().await = Some(Instant::now());
            info!("Snipe bot started");
        }
    }

    pub async fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            *self.started_at.write().await = None;
            info!("Snipe bot stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // ---- snipe configs ----

    pub async fn add_config(&self, draft: NewSnipeConfig) -> Result<String> {
        self.configs.write().await.add(draft)
    }

    pub async fn update_config(&self, id: &str, patch: SnipeConfigPatch) -> Result<bool> {
        self.configs.write().await.update(id, patch)
    }

    /// Items already queued for the config are left alone
    pub async fn remove_config(&self, id: &str) -> Option<SnipeConfig> {
        self.configs.write().await.remove(id)
    }

    pub async fn enable_config(&self, id: &str, acknowledged: bool) -> Result<()> {
        self.configs.write().await.enable(id, acknowledged)
    }

    pub async fn disable_config(&self, id: &str) -> Result<()> {
        self.configs.write().await.disable(id)
    }

    pub async fn check_enable(&self, id: &str, acknowledged: bool) -> Result<()> {
        self.configs.read().await.check_enable(id, acknowledged)
    }

    pub async fn configs(&self) -> Vec<SnipeConfig> {
        self.configs.read().await.list()
    }

    // ---- periodic work ----

    /// Sample every watched token once, then queue entries and exits
    pub async fn tick(&self) -> TickReport {
        let configs = self.configs.read().await.list();
        let mut report = TickReport::default();

        let mut prices: HashMap<TokenAddress, MarketData> = HashMap::new();
        {
            let mut market = self.market.write().await;
            for config in &configs {
                let token = &config.token_address;
                if prices.contains_key(token) {
                    continue;
                }
                let data = self.oracle.sample(token, market.get(token));
                market.insert(token.clone(), data.clone());
                prices.insert(token.clone(), data);
                report.sampled += 1;
            }
        }

        if !self.is_running() {
            return report;
        }

        let mut positions = self.positions.write().await;
        let mut intents = self.intents.write().await;
        let mut queue = self.processor.queue().write().await;

        for config in &configs {
            let Some(market) = prices.get(&config.token_address) else {
                continue;
            };

            if let Some(position) = positions.get_mut(&config.id) {
                if self.queue_exit(config, position, market, &mut queue, &mut intents) {
                    report.sells_queued += 1;
                }
            } else if entry_signal(config, market) && !has_pending_buy(&intents, &config.id) {
                self.queue_entry(config, market, &mut queue, &mut intents);
                report.buys_queued += 1;
            }
        }

        report
    }

    fn queue_entry(
        &self,
        config: &SnipeConfig,
        market: &MarketData,
        queue: &mut TransactionQueue,
        intents: &mut HashMap<String, TradeIntent>,
    ) {
        let gas = self.gas.estimate_gas(&config.token_address, config.amount);
        let slippage = match config.slippage_settings.mode {
            SlippageMode::Adaptive => {
                let params = SlippageParams::from(&config.slippage_settings);
                self.slippage
                    .calculate_smart_slippage(&config.token_address, &params)
                    .recommended_slippage
            }
            SlippageMode::Fixed => config.slippage,
        };

        let item_id = queue.enqueue(QueueOrder {
            snipe_config_id: config.id.clone(),
            token_address: config.token_address.clone(),
            trade_type: TradeType::Buy,
            amount: config.amount,
            slippage,
            priority: config.batch_settings.priority,
            gas_settings: gas,
        });

        info!(
            "Snipe {} triggered: {} at {} <= target {} (amount {}, slippage {:.2}%)",
            config.id,
            config.token_address.short(),
            market.price,
            config.target_price,
            config.amount,
            slippage
        );

        intents.insert(
            item_id,
            TradeIntent {
                config_id: config.id.clone(),
                token_address: config.token_address.clone(),
                trade_type: TradeType::Buy,
                amount: config.amount,
                price: market.price,
                ladder_index: None,
                settling: false,
            },
        );
    }

    /// Returns true when a sell was queued
    fn queue_exit(
        &self,
        config: &SnipeConfig,
        position: &mut OpenPosition,
        market: &MarketData,
        queue: &mut TransactionQueue,
        intents: &mut HashMap<String, TradeIntent>,
    ) -> bool {
        let Some(auto_sell) = config.active_auto_sell() else {
            return false;
        };
        // Always runs so the trailing peak keeps moving
        let Some(plan) = position.check_exit(market.price, auto_sell) else {
            return false;
        };
        if position.pending_exit.is_some() {
            return false;
        }

        let quantity = position.sell_quantity(plan.decision.sell_percentage);
        if quantity <= 0.0 {
            return false;
        }

        let gas = self.gas.estimate_gas(&config.token_address, quantity * market.price);
        let priority = exit_priority(plan.decision.urgency, config.batch_settings.priority);
        let item_id = queue.enqueue(QueueOrder {
            snipe_config_id: config.id.clone(),
            token_address: config.token_address.clone(),
            trade_type: TradeType::Sell,
            amount: quantity,
            slippage: config.slippage,
            priority,
            gas_settings: gas,
        });

        info!(
            "Exit for snipe {}: {} - selling {} ({:.4} tokens, priority {})",
            config.id, plan.decision.reason, plan.decision.sell_percentage, quantity, priority
        );

        position.pending_exit = Some(PendingExit {
            item_id: item_id.clone(),
            ladder_index: plan.ladder_index,
        });
        intents.insert(
            item_id,
            TradeIntent {
                config_id: config.id.clone(),
                token_address: config.token_address.clone(),
                trade_type: TradeType::Sell,
                amount: quantity,
                price: market.price,
                ladder_index: plan.ladder_index,
                settling: false,
            },
        );
        true
    }

    /// Drain one batch. `None` if a run is already in flight.
    pub async fn process_queue(&self) -> Option<BatchReport> {
        self.processor.process_queue().await
    }

    /// Drop queue items past retention along with their pending intents
    pub async fn purge_expired(&self) -> usize {
        let purged = self.processor.queue().write().await.purge_expired(Utc::now());
        if purged.is_empty() {
            return 0;
        }

        // Intents mid-settlement stay; a confirmation whose event never
        // arrived would otherwise block its config forever
        let dropped: Vec<TradeIntent> = {
            let mut intents = self.intents.write().await;
            let mut dropped = Vec::new();
            for item in &purged {
                if intents.get(&item.id).is_some_and(|i| i.settling) {
                    continue;
                }
                let Some(intent) = intents.remove(&item.id) else {
                    continue;
                };
                if item.status == QueueStatus::Confirmed {
                    warn!(
                        "{} for snipe {} expired without settling; dropping it",
                        intent.trade_type, intent.config_id
                    );
                }
                dropped.push(intent);
            }
            dropped
        };

        if !dropped.is_empty() {
            let mut positions = self.positions.write().await;
            for intent in dropped.iter().filter(|i| i.trade_type == TradeType::Sell) {
                if let Some(position) = positions.get_mut(&intent.config_id) {
                    position.pending_exit = None;
                }
            }
        }

        purged.len()
    }

    pub fn update_network_stats(&self) -> NetworkStats {
        self.network.update()
    }

    // ---- queue outcomes ----

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.processor.subscribe()
    }

    /// Apply a queue outcome. A confirmed item waits for on-chain
    /// confirmation, so callers usually run this on its own task.
    pub async fn handle_queue_event(&self, event: QueueEvent) {
        match event {
            QueueEvent::Confirmed { item, receipt } => self.settle(item, receipt).await,
            QueueEvent::Failed { item, reason } => {
                let Some(intent) = self.intents.write().await.remove(&item.id) else {
                    return;
                };
                warn!(
                    "{} for snipe {} abandoned after {} retries: {}",
                    intent.trade_type, intent.config_id, item.retry_count, reason
                );
                if intent.trade_type == TradeType::Sell {
                    self.clear_pending_exit(&intent.config_id).await;
                }
            }
            QueueEvent::RetryScheduled { .. } | QueueEvent::Requeued { .. } => {}
        }
    }

    async fn settle(&self, item: TransactionQueueItem, receipt: ExecutionReceipt) {
        // Kept until settled so ticks see the buy or exit as still pending
        let claimed = self.intents.write().await.get_mut(&item.id).map(|intent| {
            intent.settling = true;
            intent.clone()
        });
        let Some(intent) = claimed else {
            debug!("No intent for confirmed item {}", item.id);
            return;
        };

        let profit = match intent.trade_type {
            TradeType::Buy => None,
            TradeType::Sell => {
                let positions = self.positions.read().await;
                positions
                    .get(&intent.config_id)
                    .filter(|p| p.quantity > 0.0)
                    .map(|p| {
                        let sold = intent.amount.min(p.quantity);
                        sold * intent.price - p.cost_basis * (sold / p.quantity)
                    })
            }
        };

        let tx = self.ledger.write().await.record_pending(PendingTransaction {
            hash: receipt.hash.clone(),
            trade_type: intent.trade_type,
            token_address: intent.token_address.clone(),
            token_symbol: intent.token_address.placeholder_symbol(),
            amount: intent.amount,
            price: intent.price,
            gas_used: receipt.gas_used,
            gas_price: receipt.gas_price,
            profit,
        });

        let success = self.broadcaster.confirm(&receipt.hash).await;
        self.ledger.write().await.resolve(&tx.id, success);

        let mut positions = self.positions.write().await;
        self.intents.write().await.remove(&item.id);
        match intent.trade_type {
            TradeType::Buy if success => {
                let position = OpenPosition::open(
                    intent.config_id.clone(),
                    intent.token_address.clone(),
                    intent.price,
                    intent.amount,
                );
                info!(
                    "Opened position for snipe {}: {:.4} tokens at {}",
                    intent.config_id, position.quantity, intent.price
                );
                positions.add(position);
            }
            TradeType::Buy => {
                warn!("Buy {} for snipe {} did not confirm", receipt.hash, intent.config_id);
            }
            TradeType::Sell => {
                let Some(position) = positions.get_mut(&intent.config_id) else {
                    return;
                };
                position.pending_exit = None;
                if !success {
                    warn!("Sell {} for snipe {} did not confirm", receipt.hash, intent.config_id);
                    return;
                }

                let realized = position.apply_sale(intent.amount, intent.price);
                if let Some(index) = intent.ladder_index {
                    position.filled_targets.insert(index);
                }
                info!(
                    "Sold {:.4} tokens for snipe {} at {} (profit {:.6})",
                    intent.amount, intent.config_id, intent.price, realized
                );
                if position.is_closed() {
                    positions.remove(&intent.config_id);
                    info!("Closed position for snipe {}", intent.config_id);
                }
            }
        }
    }

    async fn clear_pending_exit(&self, config_id: &str) {
        if let Some(position) = self.positions.write().await.get_mut(config_id) {
            position.pending_exit = None;
        }
    }

    // ---- read-only views ----

    pub async fn market_data(&self) -> HashMap<TokenAddress, MarketData> {
        self.market.read().await.clone()
    }

    pub fn gas_estimations(&self) -> HashMap<TokenAddress, GasEstimation> {
        self.gas.estimations()
    }

    pub fn slippage_calculations(&self) -> HashMap<TokenAddress, SlippageCalculation> {
        self.slippage.calculations()
    }

    pub fn network_stats(&self) -> NetworkStats {
        self.network.snapshot()
    }

    pub async fn queue_items(&self) -> Vec<TransactionQueueItem> {
        self.processor.queue().read().await.items()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.ledger.read().await.list()
    }

    pub async fn record_historical(&self, tx: Transaction) {
        self.ledger.write().await.push_historical(tx);
    }

    pub async fn ledger_stats(&self) -> LedgerStats {
        self.ledger.read().await.stats()
    }

    pub async fn positions(&self) -> Vec<OpenPosition> {
        self.positions.read().await.list()
    }

    pub async fn status(&self) -> BotStatus {
        let stats = self.ledger_stats().await;
        let network = self.network.snapshot();
        let uptime = self
            .started_at
            .read()
            .await
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);

        let active_snipes = self.configs.read().await.enabled_count();
        let open_positions = self.positions.read().await.len();
        let transaction_queue = self.processor.queue().read().await.snapshot();

        BotStatus {
            is_running: self.is_running(),
            active_snipes,
            total_transactions: stats.resolved,
            total_profit: stats.total_profit,
            success_rate: stats.success_rate,
            uptime,
            open_positions,
            gas_estimator: GasSnapshot {
                current_base_fee: network.base_fee,
                recommended_gas_price: max_fee_for(network.base_fee),
                fast_gas_price: network.fast_gas_price,
                network_congestion: network.congestion,
            },
            transaction_queue,
        }
    }
}

fn has_pending_buy(intents: &HashMap<String, TradeIntent>, config_id: &str) -> bool {
    intents
        .values()
        .any(|i| i.config_id == config_id && i.trade_type == TradeType::Buy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBroadcaster, ScriptedOracle};
    use snipebot_core::{AutoSell, PartialSelling, SlippageSettings, TrailingStop, TransactionStatus};
    use std::time::Duration;

    const UNI: &str = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";

    struct Harness {
        engine: SnipeEngine,
        oracle: Arc<ScriptedOracle>,
        broadcaster: Arc<ScriptedBroadcaster>,
        token: TokenAddress,
    }

    fn harness(outcomes: &[bool], config: EngineConfig) -> Harness {
        let oracle = Arc::new(ScriptedOracle::default());
        let broadcaster = ScriptedBroadcaster::new(outcomes, 1_000);
        let engine = SnipeEngine::new(config, oracle.clone(), broadcaster.clone(), Some(7));
        let token = TokenAddress::parse(UNI).unwrap();
        Harness { engine, oracle, broadcaster, token }
    }

    fn draft(token: &TokenAddress) -> NewSnipeConfig {
        let mut d = NewSnipeConfig::for_token(token.clone());
        d.target_price = 0.002;
        d.max_price = 0.0025;
        d.amount = 0.5;
        d.slippage = 12.0;
        d.slippage_settings.mode = SlippageMode::Fixed;
        d.auto_sell = Some(AutoSell {
            enabled: true,
            profit_target: 50.0,
            stop_loss: -15.0,
            trailing_stop: TrailingStop::default(),
            partial_selling: PartialSelling {
                enabled: true,
                percentages: vec![25.0],
                price_targets: vec![30.0],
            },
        });
        d
    }

    async fn enabled_config(h: &Harness) -> String {
        let id = h.engine.add_config(draft(&h.token)).await.unwrap();
        h.engine.enable_config(&id, true).await.unwrap();
        id
    }

    /// Drain the queue and settle every outcome
    async fn drain(engine: &SnipeEngine) {
        let mut events = engine.subscribe();
        engine.process_queue().await.unwrap();
        while let Ok(event) = events.try_recv() {
            engine.handle_queue_event(event).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_while_stopped_only_samples() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;
        h.oracle.set_price(&h.token, 0.001);

        let report = h.engine.tick().await;
        assert_eq!(report, TickReport { sampled: 1, buys_queued: 0, sells_queued: 0 });
        assert_eq!(h.engine.market_data().await[&h.token].price, 0.001);
        assert!(h.engine.queue_items().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_sample_per_token() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;
        enabled_config(&h).await;
        h.oracle.set_price(&h.token, 0.01);
        assert_eq!(h.engine.tick().await.sampled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_queued_once_per_config() {
        let h = harness(&[], EngineConfig::default());
        let id = enabled_config(&h).await;
        h.engine.start().await;

        h.oracle.set_price(&h.token, 0.003);
        assert_eq!(h.engine.tick().await.buys_queued, 0);

        h.oracle.set_price(&h.token, 0.0019);
        assert_eq!(h.engine.tick().await.buys_queued, 1);
        assert_eq!(h.engine.tick().await.buys_queued, 0);

        let items = h.engine.queue_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].snipe_config_id, id);
        assert_eq!(items[0].trade_type, TradeType::Buy);
        assert_eq!(items[0].priority, 5);
        assert!(h.engine.gas_estimations().contains_key(&h.token));
        // fixed slippage mode does not consult the model
        assert!(h.engine.slippage_calculations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_adaptive_slippage_is_calculated() {
        let h = harness(&[], EngineConfig::default());
        let mut d = draft(&h.token);
        d.slippage_settings = SlippageSettings {
            mode: SlippageMode::Adaptive,
            ..SlippageSettings::default()
        };
        let id = h.engine.add_config(d).await.unwrap();
        h.engine.enable_config(&id, true).await.unwrap();
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.001);

        h.engine.tick().await;
        let recommended = h.engine.slippage_calculations()[&h.token].recommended_slippage;

        h.engine.process_queue().await.unwrap();
        let requests = h.broadcaster.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].slippage, recommended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_slippage_reaches_broadcaster() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.001);
        h.engine.tick().await;

        h.engine.process_queue().await.unwrap();
        assert_eq!(h.broadcaster.requests()[0].slippage, 12.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_config_does_not_buy() {
        let h = harness(&[], EngineConfig::default());
        h.engine.add_config(draft(&h.token)).await.unwrap();
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.001);
        assert_eq!(h.engine.tick().await.buys_queued, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_buy_opens_position() {
        let h = harness(&[], EngineConfig::default());
        let id = enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;

        drain(&h.engine).await;

        let positions = h.engine.positions().await;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].config_id, id);
        assert!((positions[0].quantity - 250.0).abs() < 1e-6);

        let txs = h.engine.transactions().await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Success);
        assert_eq!(txs[0].trade_type, TradeType::Buy);

        // holding: no second buy
        assert_eq!(h.engine.tick().await.buys_queued, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_loss_sells_at_top_priority() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;
        drain(&h.engine).await;

        // -20% is past the -15% stop
        h.oracle.set_price(&h.token, 0.0016);
        let report = h.engine.tick().await;
        assert_eq!(report.sells_queued, 1);
        let items = h.engine.queue_items().await;
        let sell = items.iter().find(|i| i.trade_type == TradeType::Sell).unwrap();
        assert_eq!(sell.priority, 10);

        // pending exit blocks another sell
        assert_eq!(h.engine.tick().await.sells_queued, 0);

        drain(&h.engine).await;
        assert!(h.engine.positions().await.is_empty());

        let status = h.engine.status().await;
        assert_eq!(status.total_transactions, 2);
        assert!(status.total_profit < 0.0);
        assert!((status.total_profit + 0.1).abs() < 1e-6);
        assert_eq!(status.success_rate, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_rung_fills_once() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;
        drain(&h.engine).await;

        // +35% crosses the 30% rung
        h.oracle.set_price(&h.token, 0.0027);
        assert_eq!(h.engine.tick().await.sells_queued, 1);
        drain(&h.engine).await;

        let position = &h.engine.positions().await[0];
        assert!((position.quantity - 187.5).abs() < 1e-6);
        assert!(position.filled_targets.contains(&0));

        assert_eq!(h.engine.tick().await.sells_queued, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_continue_after_disable() {
        let h = harness(&[], EngineConfig::default());
        let id = enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;
        drain(&h.engine).await;

        h.engine.disable_config(&id).await.unwrap();
        h.oracle.set_price(&h.token, 0.0035);
        assert_eq!(h.engine.tick().await.sells_queued, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_allows_new_buy() {
        let mut config = EngineConfig::default();
        config.queue.max_retries = 0;
        let h = harness(&[false], config);
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;

        drain(&h.engine).await;
        assert!(h.engine.positions().await.is_empty());
        assert_eq!(h.engine.status().await.transaction_queue.failed, 1);

        assert_eq!(h.engine.tick().await.buys_queued, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_pending_intents() {
        let mut config = EngineConfig::default();
        config.queue.retention_secs = 0;
        let h = harness(&[], config);
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.002);
        h.engine.tick().await;

        assert_eq!(h.engine.purge_expired().await, 1);
        assert!(h.engine.queue_items().await.is_empty());
        // buy intent gone, so the config may try again
        assert_eq!(h.engine.tick().await.buys_queued, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsettled_confirmation_expires_with_its_item() {
        let mut config = EngineConfig::default();
        config.queue.retention_secs = 0;
        let h = harness(&[], config);
        let id = enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.0015);
        h.engine.tick().await;

        // confirmed, but nobody handles the event
        let report = h.engine.process_queue().await.unwrap();
        assert_eq!(report.confirmed, 1);

        assert_eq!(h.engine.purge_expired().await, 1);
        assert!(h.engine.queue_items().await.is_empty());
        assert!(h.engine.positions().await.is_empty());

        let report = h.engine.tick().await;
        assert_eq!(report.buys_queued, 1);
        let items = h.engine.queue_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].snipe_config_id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_event_after_expiry_is_ignored() {
        let mut config = EngineConfig::default();
        config.queue.retention_secs = 0;
        let h = harness(&[], config);
        enabled_config(&h).await;
        h.engine.start().await;
        h.oracle.set_price(&h.token, 0.0015);
        h.engine.tick().await;

        let mut events = h.engine.subscribe();
        h.engine.process_queue().await.unwrap();
        h.engine.purge_expired().await;

        while let Ok(event) = events.try_recv() {
            h.engine.handle_queue_event(event).await;
        }
        assert!(h.engine.positions().await.is_empty());
        assert!(h.engine.transactions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_uptime_and_gas() {
        let h = harness(&[], EngineConfig::default());
        enabled_config(&h).await;

        let status = h.engine.status().await;
        assert!(!status.is_running);
        assert_eq!(status.uptime, 0);
        assert_eq!(status.active_snipes, 1);

        h.engine.start().await;
        tokio::time::sleep(Duration::from_secs(42)).await;
        let status = h.engine.status().await;
        assert!(status.is_running);
        assert_eq!(status.uptime, 42);

        let network = h.engine.network_stats();
        assert_eq!(status.gas_estimator.current_base_fee, network.base_fee);
        assert_eq!(status.gas_estimator.recommended_gas_price, max_fee_for(network.base_fee));

        h.engine.stop().await;
        assert_eq!(h.engine.status().await.uptime, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_network_stats_changes_snapshot() {
        let h = harness(&[], EngineConfig::default());
        let before = h.engine.network_stats();
        let after = h.engine.update_network_stats();
        assert_eq!(h.engine.network_stats(), after);
        assert!(after.base_fee >= 0.0);
        assert!(after.base_fee != before.base_fee || after.fast_gas_price != before.fast_gas_price);
    }
}

//! Practice-mode data: one ready-to-run snipe and a short trade history

use crate::engine::SnipeEngine;
use chrono::{Duration, Utc};
use snipebot_core::{
    AutoSell, BatchSettings, GasMode, GasSettings, NewSnipeConfig, NonceMode, PartialSelling,
    Result, SlippageMode, SlippageSettings, TokenAddress, TradeType, TrailingStop, Transaction,
    TransactionStatus,
};
use tracing::info;

const UNI: &str = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";
const PEPE: &str = "0xa0b86a33e6776d6e94c13c6e2c2c72b6b5b7e6d3";

/// The demo snipe on UNI
pub fn demo_config() -> Result<NewSnipeConfig> {
    Ok(NewSnipeConfig {
        token_address: TokenAddress::parse(UNI)?,
        target_price: 0.00234,
        max_price: 0.0025,
        amount: 0.5,
        slippage: 12.0,
        gas_price: 25.0,
        max_gas: 500_000,
        gas_settings: GasSettings {
            mode: GasMode::Auto,
            max_gas_price: 100.0,
            priority_fee: 2.0,
            execution_timeout: 120,
            retry_count: 3,
        },
        slippage_settings: SlippageSettings {
            mode: SlippageMode::Adaptive,
            base_slippage: 12.0,
            max_slippage: 25.0,
            liquidity_threshold: 100_000.0,
            volatility_multiplier: 1.5,
        },
        auto_sell: Some(AutoSell {
            enabled: true,
            profit_target: 50.0,
            stop_loss: -15.0,
            trailing_stop: TrailingStop {
                enabled: true,
                percentage: 5.0,
                activation_price: 25.0,
            },
            partial_selling: PartialSelling {
                enabled: true,
                percentages: vec![25.0, 50.0],
                price_targets: vec![30.0, 60.0],
            },
        }),
        batch_settings: BatchSettings {
            enabled: true,
            max_batch_size: 3,
            batch_delay: 200,
            nonce_management: NonceMode::Auto,
            priority: 7,
        },
    })
}

/// Two settled trades from earlier in the session
pub fn demo_history() -> Result<Vec<Transaction>> {
    let now = Utc::now();
    Ok(vec![
        Transaction {
            id: "demo-1".to_string(),
            hash: format!("0x{}", "1a2b3c4d".repeat(8)),
            trade_type: TradeType::Buy,
            token_address: TokenAddress::parse(UNI)?,
            token_symbol: "UNI".to_string(),
            amount: 0.5,
            price: 0.00234,
            gas_used: 180_000,
            gas_price: 25.0,
            timestamp: now - Duration::minutes(5),
            status: TransactionStatus::Success,
            profit: Some(0.0123),
        },
        Transaction {
            id: "demo-2".to_string(),
            hash: format!("0x{}", "5e6f7a8b".repeat(8)),
            trade_type: TradeType::Buy,
            token_address: TokenAddress::parse(PEPE)?,
            token_symbol: "PEPE".to_string(),
            amount: 0.2,
            price: 0.00001234,
            gas_used: 165_000,
            gas_price: 22.0,
            timestamp: now - Duration::minutes(10),
            status: TransactionStatus::Success,
            profit: Some(-0.0045),
        },
    ])
}

/// Register the demo snipe (enabled) and history. Returns the snipe id.
pub async fn seed(engine: &SnipeEngine) -> Result<String> {
    let id = engine.add_config(demo_config()?).await?;
    engine.enable_config(&id, true).await?;

    for tx in demo_history()? {
        engine.record_historical(tx).await;
    }

    info!("Loaded demo data: snipe {} and 2 historical trades", id);
    Ok(id)
}

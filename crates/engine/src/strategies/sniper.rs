//! Sniper strategy - entry signal for a watched token

use snipebot_core::{MarketData, SnipeConfig};

/// A config wants to buy when it is enabled and the live price is at or
/// below its target. A zero price means no market yet.
pub fn entry_signal(config: &SnipeConfig, market: &MarketData) -> bool {
    config.enabled && market.price > 0.0 && market.price <= config.target_price
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use snipebot_core::{NewSnipeConfig, TokenAddress};

    fn setup(price: f64, enabled: bool) -> (SnipeConfig, MarketData) {
        let token = TokenAddress::parse("0xa0b86a33e6776d6e94c13c6e2c2c72b6b5b7e6d3").unwrap();
        let mut draft = NewSnipeConfig::for_token(token.clone());
        draft.target_price = 0.001;
        draft.max_price = 0.002;
        let mut config = SnipeConfig::from_draft("c".into(), draft);
        config.enabled = enabled;

        let market = MarketData {
            token_address: token,
            price,
            price_change_1m: 0.0,
            price_change_5m: 0.0,
            price_change_1h: 0.0,
            volume_1h: 0.0,
            liquidity: 0.0,
            holders: 0,
            timestamp: Utc::now(),
        };
        (config, market)
    }

    #[test]
    fn test_fires_at_or_below_target() {
        let (c, m) = setup(0.001, true);
        assert!(entry_signal(&c, &m));
        let (c, m) = setup(0.0005, true);
        assert!(entry_signal(&c, &m));
    }

    #[test]
    fn test_quiet_above_target_or_disabled() {
        let (c, m) = setup(0.0011, true);
        assert!(!entry_signal(&c, &m));
        let (c, m) = setup(0.0005, false);
        assert!(!entry_signal(&c, &m));
        let (c, m) = setup(0.0, true);
        assert!(!entry_signal(&c, &m));
    }
}

//! Open positions held by snipe configs, with trailing-stop peak tracking

use super::exit::{decide, ExitPlan};
use chrono::{DateTime, Utc};
use snipebot_core::{AutoSell, Percent, TokenAddress};
use std::collections::{BTreeSet, HashMap};

/// Sell order in flight for a position
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExit {
    pub item_id: String,
    pub ladder_index: Option<usize>,
}

/// Tracks a filled buy until it is fully sold
#[derive(Debug, Clone)]
pub struct OpenPosition {
    pub config_id: String,
    pub token_address: TokenAddress,
    pub entry_price: f64,
    /// Token quantity still held
    pub quantity: f64,
    /// Native amount spent on the quantity still held
    pub cost_basis: f64,
    pub opened_at: DateTime<Utc>,
    /// Highest price since the trailing stop armed, `None` until then
    pub peak_price: Option<f64>,
    /// Partial-sell ladder rungs already sold
    pub filled_targets: BTreeSet<usize>,
    pub pending_exit: Option<PendingExit>,
}

impl OpenPosition {
    /// Position from a buy spending `spent` native units at `entry_price`
    pub fn open(config_id: String, token_address: TokenAddress, entry_price: f64, spent: f64) -> Self {
        let quantity = if entry_price > 0.0 { spent / entry_price } else { 0.0 };
        Self {
            config_id,
            token_address,
            entry_price,
            quantity,
            cost_basis: spent,
            opened_at: Utc::now(),
            peak_price: None,
            filled_targets: BTreeSet::new(),
            pending_exit: None,
        }
    }

    /// Update the trailing peak with `current_price`, then evaluate the exit policy.
    /// Returns a plan only when something should be sold.
    pub fn check_exit(&mut self, current_price: f64, auto_sell: &AutoSell) -> Option<ExitPlan> {
        self.track_peak(current_price, auto_sell);

        let plan = decide(
            auto_sell,
            self.entry_price,
            current_price,
            self.peak_price,
            &self.filled_targets,
        );
        plan.decision.should_sell.then_some(plan)
    }

    fn track_peak(&mut self, current_price: f64, auto_sell: &AutoSell) {
        let trailing = &auto_sell.trailing_stop;
        if !trailing.enabled {
            return;
        }

        match self.peak_price {
            Some(peak) if current_price > peak => self.peak_price = Some(current_price),
            Some(_) => {}
            None => {
                if self.entry_price > 0.0
                    && Percent::change(self.entry_price, current_price).as_f64() >= trailing.activation_price
                {
                    self.peak_price = Some(current_price);
                }
            }
        }
    }

    /// Token quantity a sell of `pct` percent would move
    pub fn sell_quantity(&self, pct: Percent) -> f64 {
        pct.of(self.quantity).min(self.quantity)
    }

    /// Book a sale of `quantity` tokens at `price`. Returns the realized profit.
    pub fn apply_sale(&mut self, quantity: f64, price: f64) -> f64 {
        let quantity = quantity.min(self.quantity);
        if quantity <= 0.0 {
            return 0.0;
        }

        let cost = self.cost_basis * (quantity / self.quantity);
        self.quantity -= quantity;
        self.cost_basis -= cost;
        quantity * price - cost
    }

    /// Fully sold, or left with dust
    pub fn is_closed(&self) -> bool {
        self.quantity <= f64::EPSILON
    }
}

/// Open positions keyed by snipe config id
#[derive(Debug, Default)]
pub struct PositionBook {
    positions: HashMap<String, OpenPosition>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, position: OpenPosition) {
        self.positions.insert(position.config_id.clone(), position);
    }

    pub fn remove(&mut self, config_id: &str) -> Option<OpenPosition> {
        self.positions.remove(config_id)
    }

    pub fn get(&self, config_id: &str) -> Option<&OpenPosition> {
        self.positions.get(config_id)
    }

    pub fn get_mut(&mut self, config_id: &str) -> Option<&mut OpenPosition> {
        self.positions.get_mut(config_id)
    }

    pub fn contains(&self, config_id: &str) -> bool {
        self.positions.contains_key(config_id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OpenPosition> {
        self.positions.values_mut()
    }

    pub fn list(&self) -> Vec<OpenPosition> {
        self.positions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

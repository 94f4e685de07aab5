//! Exit strategy - stop loss / take profit / partial ladder / trailing stop

use snipebot_core::{AutoSell, ExitDecision, ExitTrigger, Percent, SnipeConfig, Urgency};
use std::collections::BTreeSet;

/// Queue priority used for urgent exits
pub const URGENT_EXIT_PRIORITY: u8 = 10;

/// A decision plus the ladder rung it came from, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ExitPlan {
    pub decision: ExitDecision,
    /// Index into the partial-selling ladder when the trigger was a partial sell
    pub ladder_index: Option<usize>,
}

/// Evaluate the exit policy of `config` for a position bought at `buy_price`.
///
/// `None` when auto-sell is off. Otherwise a sell decision or a hold.
/// Carries no state between calls, so the trailing stop compares against the
/// current price only; use [`super::OpenPosition::check_exit`] for peak tracking.
pub fn evaluate_exit(buy_price: f64, current_price: f64, config: &SnipeConfig) -> Option<ExitDecision> {
    let auto_sell = config.active_auto_sell()?;
    let plan = decide(auto_sell, buy_price, current_price, Some(current_price), &BTreeSet::new());
    Some(plan.decision)
}

/// Queue priority for an exit order
pub fn exit_priority(urgency: Urgency, base: u8) -> u8 {
    match urgency {
        Urgency::High => URGENT_EXIT_PRIORITY,
        _ => base,
    }
}

/// Core evaluation, first match wins:
/// stop loss, take profit, first unfilled partial target, trailing stop.
///
/// `peak` is the high-water mark of an armed trailing stop.
pub(crate) fn decide(
    auto_sell: &AutoSell,
    buy_price: f64,
    current_price: f64,
    peak: Option<f64>,
    filled: &BTreeSet<usize>,
) -> ExitPlan {
    if !(buy_price > 0.0) {
        return ExitPlan {
            decision: ExitDecision::hold(Percent::new(0.0)),
            ladder_index: None,
        };
    }

    let change = Percent::change(buy_price, current_price);
    let pct = change.as_f64();

    if pct <= auto_sell.stop_loss {
        return full_exit(
            ExitTrigger::StopLoss,
            Urgency::High,
            change,
            format!("Stop-loss triggered at {}", change),
        );
    }

    if pct >= auto_sell.profit_target {
        return full_exit(
            ExitTrigger::TakeProfit,
            Urgency::Normal,
            change,
            format!("Take-profit triggered at {}", change),
        );
    }

    let partial = &auto_sell.partial_selling;
    if partial.enabled {
        let hit = partial
            .ladder()
            .enumerate()
            .find(|(i, (target, _))| !filled.contains(i) && pct >= *target);

        if let Some((index, (target, sell_pct))) = hit {
            return ExitPlan {
                decision: ExitDecision::sell(
                    ExitTrigger::PartialSell,
                    sell_pct,
                    Urgency::Low,
                    change,
                    format!("Partial sell {}% at {} (target {}%)", sell_pct, change, target),
                ),
                ladder_index: Some(index),
            };
        }
    }

    let trailing = &auto_sell.trailing_stop;
    if trailing.enabled && pct >= trailing.activation_price {
        if let Some(peak) = peak {
            let stop_price = peak * (1.0 - trailing.percentage / 100.0);
            if current_price <= stop_price {
                return full_exit(
                    ExitTrigger::TrailingStop,
                    Urgency::High,
                    change,
                    format!("Trailing stop triggered at {} (peak {})", change, peak),
                );
            }
        }
    }

    ExitPlan {
        decision: ExitDecision::hold(change),
        ladder_index: None,
    }
}

fn full_exit(trigger: ExitTrigger, urgency: Urgency, change: Percent, reason: String) -> ExitPlan {
    ExitPlan {
        decision: ExitDecision::sell(trigger, 100.0, urgency, change, reason),
        ladder_index: None,
    }
}

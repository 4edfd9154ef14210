//! Plan-vs-execution review: how the realized trades compare to the plan.
//!
//! Produced once, when a position's derived status reaches Closed. The
//! function itself is total (it degrades to zeroed figures on thin input),
//! but the "actual exit" numbers only mean something for a closed position,
//! so callers gate on status before presenting them.

use crate::domain::{Decimal, Direction, Position};
use crate::engine::fifo::PositionReport;
use serde::Serialize;

/// Three-way execution-quality verdict under an absolute tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Better,
    Worse,
    OnTarget,
}

/// Planned vs actual for one price figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub planned: Decimal,
    pub actual: Decimal,
    pub delta: Decimal,
    /// Delta as a percentage of the planned value; None when the planned
    /// reference is too close to zero to divide by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_pct: Option<Decimal>,
    pub verdict: Verdict,
}

/// Planned vs actual total profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitComparison {
    pub target_profit: Decimal,
    pub actual_profit: Decimal,
    pub delta: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_pct: Option<Decimal>,
    pub verdict: Verdict,
}

/// The one-time comparison artifact for a closed position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReview {
    pub entry: PriceComparison,
    pub exit: PriceComparison,
    pub profit: ProfitComparison,
}

/// Compare a position's plan against its executed trades and realized P&L.
///
/// `tolerance` is an absolute price tolerance (default one cent); the profit
/// comparison scales it by the planned quantity so per-share noise does not
/// flip the overall verdict.
pub fn review_plan(
    position: &Position,
    report: &PositionReport,
    tolerance: Decimal,
) -> PlanReview {
    let actual_entry = weighted_average(position, Direction::Buy);
    let actual_exit = weighted_average(position, Direction::Sell);

    let planned_entry = position.plan.entry_price;
    let planned_exit = position.plan.target_price;
    let planned_qty = Decimal::from_i64(position.plan.quantity);

    let entry_delta = actual_entry - planned_entry;
    let exit_delta = actual_exit - planned_exit;

    // Paying less than planned is better; selling for more than planned is
    // better.
    let entry_verdict = classify(entry_delta, tolerance, true);
    let exit_verdict = classify(exit_delta, tolerance, false);

    let target_profit = (planned_exit - planned_entry) * planned_qty;
    let actual_profit = report.realized_pnl;
    let profit_delta = actual_profit - target_profit;
    let profit_tolerance = tolerance * planned_qty;
    let profit_verdict = classify(profit_delta, profit_tolerance, false);

    PlanReview {
        entry: PriceComparison {
            planned: planned_entry,
            actual: actual_entry,
            delta: entry_delta,
            delta_pct: percentage(entry_delta, planned_entry, tolerance),
            verdict: entry_verdict,
        },
        exit: PriceComparison {
            planned: planned_exit,
            actual: actual_exit,
            delta: exit_delta,
            delta_pct: percentage(exit_delta, planned_exit, tolerance),
            verdict: exit_verdict,
        },
        profit: ProfitComparison {
            target_profit,
            actual_profit,
            delta: profit_delta,
            delta_pct: percentage(profit_delta, target_profit, profit_tolerance),
            verdict: profit_verdict,
        },
    }
}

/// Volume-weighted average price of one side of the trade log; zero when
/// that side is empty.
fn weighted_average(position: &Position, direction: Direction) -> Decimal {
    let mut quantity = 0i64;
    let mut notional = Decimal::zero();
    for trade in position.trades() {
        if trade.direction == direction {
            quantity += trade.quantity;
            notional = notional + trade.price * Decimal::from_i64(trade.quantity);
        }
    }
    if quantity == 0 {
        Decimal::zero()
    } else {
        notional / Decimal::from_i64(quantity)
    }
}

/// Classify a delta under an absolute tolerance. `lower_is_better` flips the
/// sign sense (entry prices: paying less beats the plan).
fn classify(delta: Decimal, tolerance: Decimal, lower_is_better: bool) -> Verdict {
    if delta.abs() <= tolerance.abs() {
        Verdict::OnTarget
    } else if delta.is_negative() == lower_is_better {
        Verdict::Better
    } else {
        Verdict::Worse
    }
}

/// Delta as a percentage of the planned reference, guarding the
/// near-zero-reference divide.
fn percentage(delta: Decimal, reference: Decimal, tolerance: Decimal) -> Option<Decimal> {
    if reference.abs() <= tolerance.abs() {
        None
    } else {
        Some(delta / reference * Decimal::hundred())
    }
}

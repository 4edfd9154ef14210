//! FIFO lot matching: realized/unrealized P&L with per-trade attribution.
//!
//! The lot queue is local to one call; nothing survives past it, so the
//! function is pure from the outside. No rounding happens here; callers
//! round for display only.

use crate::domain::{Decimal, Direction, Trade, TradeId};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// An open lot: quantity from one entry trade not yet matched by an exit.
#[derive(Debug, Clone)]
struct Lot {
    trade_id: TradeId,
    price: Decimal,
    remaining: i64,
}

/// One slice of an exit matched against one entry lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotMatch {
    pub entry_trade_id: TradeId,
    pub quantity: i64,
    pub entry_price: Decimal,
    pub realized_pnl: Decimal,
}

/// Per-trade P&L attribution, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePnl {
    pub trade_id: TradeId,
    pub direction: Direction,
    pub quantity: i64,
    /// For exits: quantity actually matched against entry lots.
    pub matched_quantity: i64,
    pub realized_pnl: Decimal,
    /// For exits: the entry lots consumed, oldest first.
    pub consumed_lots: Vec<LotMatch>,
}

/// Result of matching one instrument's trade log. Ephemeral; recomputed on
/// demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FifoReport {
    pub per_trade: Vec<TradePnl>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub open_quantity: i64,
    /// Weighted-average cost of the remaining open quantity (0 when flat).
    pub avg_open_cost: Decimal,
    pub fully_closed: bool,
}

impl FifoReport {
    /// The all-zero, fully-closed report for an empty trade log.
    pub fn empty() -> Self {
        FifoReport {
            per_trade: Vec::new(),
            realized_pnl: Decimal::zero(),
            unrealized_pnl: Decimal::zero(),
            total_pnl: Decimal::zero(),
            open_quantity: 0,
            avg_open_cost: Decimal::zero(),
            fully_closed: true,
        }
    }
}

/// Match one instrument's trades oldest-first and value the remainder at
/// `mark_price`.
///
/// Trades are ordered by execution timestamp with a stable sort, so equal
/// timestamps keep their insertion order. Buys push lots; sells consume from
/// the head (oldest) lot until satisfied. A sell with no lots left to consume
/// matches what it can and carries zero P&L for the rest; the validation
/// boundary upstream is what prevents that input from arising.
pub fn process_fifo(trades: &[Trade], mark_price: Decimal) -> FifoReport {
    if trades.is_empty() {
        return FifoReport::empty();
    }

    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.executed_at);

    let mut lots: VecDeque<Lot> = VecDeque::new();
    let mut per_trade: Vec<TradePnl> = Vec::with_capacity(ordered.len());
    let mut realized_total = Decimal::zero();

    for trade in ordered {
        match trade.direction {
            Direction::Buy => {
                lots.push_back(Lot {
                    trade_id: trade.id,
                    price: trade.price,
                    remaining: trade.quantity,
                });
                per_trade.push(TradePnl {
                    trade_id: trade.id,
                    direction: Direction::Buy,
                    quantity: trade.quantity,
                    matched_quantity: 0,
                    realized_pnl: Decimal::zero(),
                    consumed_lots: Vec::new(),
                });
            }
            Direction::Sell => {
                let mut remaining = trade.quantity;
                let mut matched = 0i64;
                let mut trade_pnl = Decimal::zero();
                let mut consumed: Vec<LotMatch> = Vec::new();

                while remaining > 0 {
                    let Some(head) = lots.front_mut() else { break };
                    let take = remaining.min(head.remaining);
                    let slice_pnl =
                        (trade.price - head.price) * Decimal::from_i64(take);

                    consumed.push(LotMatch {
                        entry_trade_id: head.trade_id,
                        quantity: take,
                        entry_price: head.price,
                        realized_pnl: slice_pnl,
                    });
                    trade_pnl = trade_pnl + slice_pnl;
                    matched += take;
                    remaining -= take;
                    head.remaining -= take;
                    if head.remaining == 0 {
                        lots.pop_front();
                    }
                }

                realized_total = realized_total + trade_pnl;
                per_trade.push(TradePnl {
                    trade_id: trade.id,
                    direction: Direction::Sell,
                    quantity: trade.quantity,
                    matched_quantity: matched,
                    realized_pnl: trade_pnl,
                    consumed_lots: consumed,
                });
            }
        }
    }

    let open_quantity: i64 = lots.iter().map(|l| l.remaining).sum();
    let avg_open_cost = if open_quantity == 0 {
        Decimal::zero()
    } else {
        let open_cost: Decimal = lots
            .iter()
            .map(|l| l.price * Decimal::from_i64(l.remaining))
            .sum();
        open_cost / Decimal::from_i64(open_quantity)
    };
    let unrealized_pnl = if open_quantity == 0 {
        Decimal::zero()
    } else {
        (mark_price - avg_open_cost) * Decimal::from_i64(open_quantity)
    };

    FifoReport {
        per_trade,
        realized_pnl: realized_total,
        unrealized_pnl,
        total_pnl: realized_total + unrealized_pnl,
        open_quantity,
        avg_open_cost,
        fully_closed: open_quantity == 0,
    }
}

/// One instrument group within a position report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentReport {
    pub instrument: String,
    pub report: FifoReport,
}

/// Whole-position P&L: the engine run per instrument group, totals summed.
/// Lots never cross instrument groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionReport {
    pub groups: Vec<InstrumentReport>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub fully_closed: bool,
}

/// Group a position's trades by instrument and run the engine per group.
///
/// `marks` supplies the valuation price per instrument; a group with no mark
/// is valued with zero unrealized P&L rather than failing.
pub fn process_fifo_grouped(
    trades: &[Trade],
    marks: &HashMap<String, Decimal>,
) -> PositionReport {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Trade>> = HashMap::new();
    for trade in trades {
        let key = trade.instrument().to_string();
        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }
        grouped.entry(key).or_default().push(trade.clone());
    }

    let mut groups = Vec::with_capacity(order.len());
    let mut realized = Decimal::zero();
    let mut unrealized = Decimal::zero();
    let mut fully_closed = true;

    for instrument in order {
        let group_trades = grouped.remove(&instrument).unwrap_or_default();
        let report = match marks.get(&instrument) {
            Some(mark) => process_fifo(&group_trades, *mark),
            None => {
                let mut report = process_fifo(&group_trades, Decimal::zero());
                report.unrealized_pnl = Decimal::zero();
                report.total_pnl = report.realized_pnl;
                report
            }
        };
        realized = realized + report.realized_pnl;
        unrealized = unrealized + report.unrealized_pnl;
        fully_closed = fully_closed && report.fully_closed;
        groups.push(InstrumentReport { instrument, report });
    }

    PositionReport {
        groups,
        realized_pnl: realized,
        unrealized_pnl: unrealized,
        total_pnl: realized + unrealized,
        fully_closed,
    }
}

//! Position aggregate: a trade plan plus its realized trade history.
//!
//! Lifecycle status is always derived from the trade log via
//! [`crate::engine::status::compute_status`]; no code path sets it directly.
//! `append_trade` is the single validation boundary in front of the log.

use crate::domain::{
    Decimal, Direction, OptionKind, PositionId, PriceBasis, Symbol, TimeMs, Trade, ValidationError,
};
use crate::engine::status::{compute_status, PositionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The plan half of a position: what the trader intended before executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub entry_price: Decimal,
    /// Shares for stock strategies, contracts for option strategies.
    pub quantity: i64,
    /// Profit-target price (the planned exit).
    pub target_price: Decimal,
    pub stop_price: Decimal,
    /// Free-text rationale for the trade.
    pub thesis: String,
}

/// Contract terms for option strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTerms {
    pub strike: Decimal,
    pub expiration: NaiveDate,
    /// Premium in dollars per contract (100 shares).
    pub premium_per_contract: Decimal,
    /// What the profit target is measured against.
    pub target_basis: PriceBasis,
    /// What the stop is measured against.
    pub stop_basis: PriceBasis,
}

/// Strategy kind. Option-only fields live on the option variants, so they
/// exist exactly when the strategy calls for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "option", rename_all = "camelCase")]
pub enum Strategy {
    StockLong,
    ShortPut(OptionTerms),
    ShortCall(OptionTerms),
}

impl Strategy {
    pub fn is_option(&self) -> bool {
        self.option_terms().is_some()
    }

    pub fn option_terms(&self) -> Option<&OptionTerms> {
        match self {
            Strategy::StockLong => None,
            Strategy::ShortPut(terms) | Strategy::ShortCall(terms) => Some(terms),
        }
    }

    pub fn option_kind(&self) -> Option<OptionKind> {
        match self {
            Strategy::StockLong => None,
            Strategy::ShortPut(_) => Some(OptionKind::Put),
            Strategy::ShortCall(_) => Some(OptionKind::Call),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::StockLong => "stock long",
            Strategy::ShortPut(_) => "short put",
            Strategy::ShortCall(_) => "short call",
        }
    }
}

/// A position: plan, strategy, and an owned insertion-ordered trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: PositionId,
    pub symbol: Symbol,
    pub strategy: Strategy,
    pub plan: TradePlan,
    pub created_at: TimeMs,
    trades: Vec<Trade>,
}

impl Position {
    pub fn new(symbol: Symbol, strategy: Strategy, plan: TradePlan, created_at: TimeMs) -> Self {
        Position {
            id: PositionId::generate(),
            symbol,
            strategy,
            plan,
            created_at,
            trades: Vec::new(),
        }
    }

    /// Rehydrate a persisted aggregate. `trades` must be in insertion order.
    pub fn from_parts(
        id: PositionId,
        symbol: Symbol,
        strategy: Strategy,
        plan: TradePlan,
        created_at: TimeMs,
        trades: Vec<Trade>,
    ) -> Self {
        Position {
            id,
            symbol,
            strategy,
            plan,
            created_at,
            trades,
        }
    }

    /// The trade log, insertion-ordered. Append-only via [`Self::append_trade`].
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Derived lifecycle status. Never stored as ground truth.
    pub fn status(&self) -> PositionStatus {
        compute_status(&self.trades)
    }

    /// Net signed quantity over the whole trade log.
    pub fn net_quantity(&self) -> i64 {
        self.trades.iter().map(|t| t.signed_quantity()).sum()
    }

    /// Net signed quantity for one instrument (lots never cross instruments).
    pub fn net_quantity_of(&self, instrument: &str) -> i64 {
        self.trades
            .iter()
            .filter(|t| t.instrument() == instrument)
            .map(|t| t.signed_quantity())
            .sum()
    }

    /// Validate and append a trade, returning the recomputed status.
    ///
    /// Rejections leave the trade log untouched. Rules:
    /// quantity must be a positive integer; entry (buy) prices strictly
    /// positive, exit (sell) prices non-negative; exits are forbidden while
    /// the position is still planned; an exit may not exceed the open
    /// quantity of its instrument; option strategies require option contract
    /// details on every trade.
    pub fn append_trade(&mut self, trade: Trade) -> Result<PositionStatus, ValidationError> {
        if trade.position_id != self.id {
            return Err(ValidationError::new(
                "positionId",
                trade.position_id,
                format!("trade belongs to a different position than {}", self.id),
            ));
        }

        if trade.quantity <= 0 {
            return Err(ValidationError::new(
                "quantity",
                trade.quantity,
                "must be a positive integer",
            ));
        }

        match trade.direction {
            Direction::Buy => {
                if !trade.price.is_positive() {
                    return Err(ValidationError::new(
                        "price",
                        trade.price,
                        "entry price must be strictly positive",
                    ));
                }
            }
            Direction::Sell => {
                if trade.price.is_negative() {
                    return Err(ValidationError::new(
                        "price",
                        trade.price,
                        "exit price must be zero or positive",
                    ));
                }
                if self.status() == PositionStatus::Planned {
                    return Err(ValidationError::new(
                        "direction",
                        trade.direction,
                        "cannot exit a planned position with no entry trade",
                    )
                    .with_remediation("record the entry trade first"));
                }
                let open = self.net_quantity_of(trade.instrument());
                if trade.quantity > open {
                    return Err(ValidationError::new(
                        "quantity",
                        trade.quantity,
                        format!("exceeds open quantity of {}", open),
                    )
                    .with_remediation(
                        "to reverse a position, close it first, then open a new one in the \
                         opposite direction",
                    ));
                }
            }
        }

        if self.strategy.is_option() && trade.option.is_none() {
            return Err(ValidationError::new(
                "option",
                "null",
                format!(
                    "trades on a {} position require option contract details",
                    self.strategy.label()
                ),
            ));
        }

        self.trades.push(trade);
        Ok(self.status())
    }
}

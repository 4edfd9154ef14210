//! Trade type representing a single immutable execution record.

use crate::domain::{
    Decimal, Direction, OptionKind, PositionId, Symbol, TimeMs, TradeId,
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Option-specific attributes carried by trades on option strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub kind: OptionKind,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    /// Premium in dollars per contract (100 shares).
    pub premium_per_contract: Decimal,
    /// Derived OCC-style contract symbol, e.g. "AAPL  260116P00100000".
    pub option_symbol: String,
}

impl OptionLeg {
    pub fn new(
        underlying: &Symbol,
        kind: OptionKind,
        strike: Decimal,
        expiration: NaiveDate,
        premium_per_contract: Decimal,
    ) -> Self {
        let option_symbol = occ_symbol(underlying, kind, strike, expiration);
        OptionLeg {
            kind,
            strike,
            expiration,
            premium_per_contract,
            option_symbol,
        }
    }
}

/// Linkage recorded on an option's closing trade when assignment spawned a
/// stock position from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLink {
    /// The stock position created by the assignment.
    pub stock_position_id: PositionId,
    /// Total premium credited to the stock position's cost basis.
    pub cost_basis_adjustment: Decimal,
}

/// A single trade execution.
///
/// Economic fields (direction, quantity, price, timestamp, underlying) are
/// immutable once persisted; trade histories are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub position_id: PositionId,
    pub direction: Direction,
    /// Always positive; shares for stock trades, contracts for option trades.
    pub quantity: i64,
    /// Non-negative. Zero is valid only for worthless/expired exits.
    pub price: Decimal,
    pub executed_at: TimeMs,
    pub underlying: Symbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<OptionLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentLink>,
}

impl Trade {
    pub fn new(
        position_id: PositionId,
        direction: Direction,
        quantity: i64,
        price: Decimal,
        executed_at: TimeMs,
        underlying: Symbol,
    ) -> Self {
        Trade {
            id: TradeId::generate(),
            position_id,
            direction,
            quantity,
            price,
            executed_at,
            underlying,
            option: None,
            assignment: None,
        }
    }

    /// Attach option contract details.
    pub fn with_option_leg(mut self, leg: OptionLeg) -> Self {
        self.option = Some(leg);
        self
    }

    /// Attach assignment linkage (only set by the assignment workflow).
    pub fn with_assignment(mut self, link: AssignmentLink) -> Self {
        self.assignment = Some(link);
        self
    }

    /// Signed quantity: +quantity for buys, -quantity for sells.
    pub fn signed_quantity(&self) -> i64 {
        self.direction.sign() * self.quantity
    }

    /// The instrument this trade is matched under.
    ///
    /// Option legs match against other trades in the same contract, never
    /// against the underlying's stock trades.
    pub fn instrument(&self) -> &str {
        match &self.option {
            Some(leg) => &leg.option_symbol,
            None => self.underlying.as_str(),
        }
    }
}

/// Derive the standardized OCC contract symbol: padded underlying, YYMMDD
/// expiration, C/P, strike in thousandths of a dollar.
pub fn occ_symbol(
    underlying: &Symbol,
    kind: OptionKind,
    strike: Decimal,
    expiration: NaiveDate,
) -> String {
    let strike_millis = (strike * Decimal::from_i64(1000))
        .inner()
        .round()
        .to_i64()
        .unwrap_or(0);
    format!(
        "{:<6}{}{}{:08}",
        underlying.as_str(),
        expiration.format("%y%m%d"),
        kind.occ_code(),
        strike_millis
    )
}

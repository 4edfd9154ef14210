//! Lifecycle status derivation.
//!
//! Status is a pure function of the trade log and only of its multiset of
//! signed quantities, so reordering trades never changes the answer.

use crate::domain::Trade;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    /// No trades recorded yet.
    Planned,
    /// Net quantity is nonzero.
    Open,
    /// Net quantity returned to zero.
    Closed,
}

impl std::fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionStatus::Planned => write!(f, "planned"),
            PositionStatus::Open => write!(f, "open"),
            PositionStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for PositionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(PositionStatus::Planned),
            "open" => Ok(PositionStatus::Open),
            "closed" => Ok(PositionStatus::Closed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Derive lifecycle status from a trade log.
///
/// Empty log is Planned; net quantity zero is Closed; anything else is Open.
/// A negative net also reports Open; the append boundary is what prevents
/// net quantity from going negative, not this function. Closed is terminal
/// only in the sense that no further derivation happens here: a later entry
/// trade computes back to Open.
pub fn compute_status(trades: &[Trade]) -> PositionStatus {
    if trades.is_empty() {
        return PositionStatus::Planned;
    }
    let net: i64 = trades.iter().map(|t| t.signed_quantity()).sum();
    if net == 0 {
        PositionStatus::Closed
    } else {
        PositionStatus::Open
    }
}

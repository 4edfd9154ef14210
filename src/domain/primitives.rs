//! Domain primitives: ids, Symbol, Direction, TimeMs, option enums.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a position aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(pub Uuid);

impl PositionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        PositionId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PositionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(PositionId)
    }
}

/// Unique identifier for a trade execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub Uuid);

impl TradeId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        TradeId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TradeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TradeId)
    }
}

/// Instrument/ticker symbol (e.g. "AAPL", "SPY").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(sym: impl Into<String>) -> Self {
        Symbol(sym.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade direction: Buy opens/adds, Sell exits/reduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Signed multiplier for net-quantity math (+1 for Buy, -1 for Sell).
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Execution time in milliseconds since Unix epoch.
///
/// FIFO ordering sorts on this; ties keep insertion order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Option contract kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Single-letter OCC code.
    pub fn occ_code(&self) -> char {
        match self {
            OptionKind::Call => 'C',
            OptionKind::Put => 'P',
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Call => write!(f, "call"),
            OptionKind::Put => write!(f, "put"),
        }
    }
}

/// Which price series a planned target or stop is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    /// Target tracks the underlying's price.
    Underlying,
    /// Target tracks the option premium itself.
    Premium,
}

impl std::fmt::Display for PriceBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceBasis::Underlying => write!(f, "underlying"),
            PriceBasis::Premium => write!(f, "premium"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Buy.sign(), 1);
        assert_eq!(Direction::Sell.sign(), -1);
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Direction::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn test_direction_parse_rejects_unknown() {
        assert!(Direction::from_str("hold").is_err());
    }

    #[test]
    fn test_position_id_roundtrip() {
        let id = PositionId::generate();
        let parsed = PositionId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_time_ms_ordering() {
        assert!(TimeMs::new(1000) < TimeMs::new(2000));
    }

    #[test]
    fn test_option_kind_occ_code() {
        assert_eq!(OptionKind::Put.occ_code(), 'P');
        assert_eq!(OptionKind::Call.occ_code(), 'C');
    }
}

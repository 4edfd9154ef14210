//! Domain types for the trade journal ledger.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: ids, Symbol, Direction, TimeMs, option enums
//! - Trade and Position aggregates with the append-time validation boundary
//! - Assignment and journal records

pub mod assignment;
pub mod decimal;
pub mod journal;
pub mod position;
pub mod primitives;
pub mod trade;
pub mod validation;

pub use assignment::AssignmentEvent;
pub use decimal::Decimal;
pub use journal::JournalEntry;
pub use position::{OptionTerms, Position, Strategy, TradePlan};
pub use primitives::{Direction, OptionKind, PositionId, PriceBasis, Symbol, TimeMs, TradeId};
pub use trade::{occ_symbol, AssignmentLink, OptionLeg, Trade};
pub use validation::ValidationError;

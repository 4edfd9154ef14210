//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `positions.rs` - Position aggregate and trade-append operations
//! - `assignments.rs` - Atomic assignment commit and event queries
//! - `prices.rs` - Daily close price history
//! - `journal.rs` - Journal entry linkage
//!
//! Decimals are persisted as canonical strings; a corrupted column degrades
//! with a warning instead of failing the read, so a damaged record heals on
//! the next write rather than wedging every query that touches it.

mod assignments;
mod journal;
mod positions;
mod prices;

use crate::domain::Decimal;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;
use tracing::warn;

pub use positions::AppendTradeError;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Parse a stored decimal column, degrading to zero on corruption.
pub(crate) fn parse_decimal_col(value: &str, table: &str, column: &str) -> Decimal {
    Decimal::from_str_canonical(value).unwrap_or_else(|_| {
        warn!(table, column, value, "corrupt decimal column, using 0");
        Decimal::zero()
    })
}

/// Parse a stored ISO date column, degrading to the epoch date on corruption.
pub(crate) fn parse_date_col(value: &str, table: &str, column: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_else(|_| {
        warn!(table, column, value, "corrupt date column, using epoch");
        NaiveDate::default()
    })
}

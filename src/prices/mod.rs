//! Price lookup abstraction for valuing open quantity.
//!
//! The ledger only ever consumes the closing price; where prices come from
//! (manual entry, an import job) is someone else's concern.

use crate::db::Repository;
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod mock;

pub use mock::MockPrices;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("price lookup failed: {0}")]
    Db(#[from] sqlx::Error),
}

/// Price lookup collaborator.
///
/// Returns the latest known closing price for the instrument, at or before
/// `on` when a date is given, or `None` when no price is known.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest_close(
        &self,
        symbol: &Symbol,
        on: Option<NaiveDate>,
    ) -> Result<Option<Decimal>, PriceError>;
}

/// Price source backed by the repository's price history table.
#[derive(Clone)]
pub struct StoredPrices {
    repo: Arc<Repository>,
}

impl StoredPrices {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl PriceSource for StoredPrices {
    async fn latest_close(
        &self,
        symbol: &Symbol,
        on: Option<NaiveDate>,
    ) -> Result<Option<Decimal>, PriceError> {
        Ok(self.repo.latest_close(symbol, on).await?)
    }
}

/// Resolve marks for a set of instruments through a price source.
///
/// Instruments with no known price are simply absent from the returned map;
/// the FIFO wrapper degrades their unrealized P&L to zero.
pub async fn resolve_marks(
    source: &dyn PriceSource,
    instruments: &[String],
    on: Option<NaiveDate>,
) -> Result<HashMap<String, Decimal>, PriceError> {
    let mut marks = HashMap::with_capacity(instruments.len());
    for instrument in instruments {
        let symbol = Symbol::new(instrument.clone());
        if let Some(close) = source.latest_close(&symbol, on).await? {
            marks.insert(instrument.clone(), close);
        }
    }
    Ok(marks)
}

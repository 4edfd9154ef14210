//! In-memory price source for tests.

use super::{PriceError, PriceSource};
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Fixed closing prices keyed by symbol; date is ignored.
#[derive(Debug, Clone, Default)]
pub struct MockPrices {
    closes: HashMap<String, Decimal>,
}

impl MockPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close(mut self, symbol: &str, close: Decimal) -> Self {
        self.closes.insert(symbol.to_string(), close);
        self
    }
}

#[async_trait]
impl PriceSource for MockPrices {
    async fn latest_close(
        &self,
        symbol: &Symbol,
        _on: Option<NaiveDate>,
    ) -> Result<Option<Decimal>, PriceError> {
        Ok(self.closes.get(symbol.as_str()).copied())
    }
}

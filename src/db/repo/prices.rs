//! Daily close price history. Valuation reads the close column exclusively.

use crate::domain::{Decimal, Symbol};
use chrono::NaiveDate;
use sqlx::Row;

use super::{parse_decimal_col, Repository};

impl Repository {
    /// Insert or overwrite the closing price for a symbol on a day.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn upsert_price(
        &self,
        symbol: &Symbol,
        day: NaiveDate,
        close: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO price_history (symbol, day, close)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(symbol.as_str())
        .bind(day.format("%Y-%m-%d").to_string())
        .bind(close.to_canonical_string())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Latest known close for a symbol, at or before `on` when given.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn latest_close(
        &self,
        symbol: &Symbol,
        on: Option<NaiveDate>,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        // ISO dates compare correctly as text.
        let row = match on {
            Some(day) => {
                sqlx::query(
                    r#"
                    SELECT close FROM price_history
                    WHERE symbol = ? AND day <= ?
                    ORDER BY day DESC LIMIT 1
                    "#,
                )
                .bind(symbol.as_str())
                .bind(day.format("%Y-%m-%d").to_string())
                .fetch_optional(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT close FROM price_history
                    WHERE symbol = ?
                    ORDER BY day DESC LIMIT 1
                    "#,
                )
                .bind(symbol.as_str())
                .fetch_optional(self.pool())
                .await?
            }
        };

        Ok(row.map(|r| {
            parse_decimal_col(&r.get::<String, _>("close"), "price_history", "close")
        }))
    }
}

//! Position aggregate persistence: CRUD plus the serialized trade append.

use crate::domain::{
    AssignmentLink, Direction, OptionKind, OptionLeg, OptionTerms, Position, PositionId,
    PriceBasis, Strategy, Symbol, TimeMs, Trade, TradeId, TradePlan, ValidationError,
};
use crate::engine::status::PositionStatus;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use super::{parse_date_col, parse_decimal_col, Repository};

/// Failure modes of the transactional trade append.
#[derive(Debug, Error)]
pub enum AppendTradeError {
    #[error("position not found: {0}")]
    NotFound(PositionId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl Repository {
    /// Persist a new position aggregate (plan only or with trades).
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn create_position(&self, position: &Position) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;
        Self::upsert_position_conn(&mut tx, position).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Load one position aggregate with its trades in insertion order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_position(
        &self,
        id: PositionId,
    ) -> Result<Option<Position>, sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        Self::load_position_conn(&mut conn, id).await
    }

    /// Load every position aggregate, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_positions(&self) -> Result<Vec<Position>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM positions ORDER BY created_at ASC, id ASC")
            .fetch_all(self.pool())
            .await?;

        let mut positions = Vec::with_capacity(rows.len());
        for row in &rows {
            let id_str = row.get::<String, _>("id");
            let Ok(id) = PositionId::from_str(&id_str) else {
                warn!(id = %id_str, "corrupt position id, skipping row");
                continue;
            };
            let trades = self.load_trades(id).await?;
            positions.push(position_from_row(row, id, trades));
        }
        Ok(positions)
    }

    /// Rewrite a full position aggregate, refreshing the status cache.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn update_position(&self, position: &Position) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;
        Self::upsert_position_conn(&mut tx, position).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a position; its trades cascade.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_position(&self, id: PositionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM positions WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Validate and append a trade inside one transaction.
    ///
    /// The aggregate is re-read under the transaction so two concurrent
    /// appends to the same position cannot interleave their
    /// read-modify-write of the trade log and the derived status cache.
    pub async fn append_trade(
        &self,
        position_id: PositionId,
        trade: Trade,
    ) -> Result<(Position, PositionStatus), AppendTradeError> {
        let mut tx = self.pool().begin().await?;

        let mut position = Self::load_position_conn(&mut tx, position_id)
            .await?
            .ok_or(AppendTradeError::NotFound(position_id))?;

        let seq = position.trades().len() as i64;
        let status = position.append_trade(trade.clone())?;

        Self::insert_trade_conn(&mut tx, &trade, seq).await?;
        sqlx::query("UPDATE positions SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(position_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((position, status))
    }

    pub(super) async fn load_position_conn(
        conn: &mut SqliteConnection,
        id: PositionId,
    ) -> Result<Option<Position>, sqlx::Error> {
        let Some(row) = sqlx::query("SELECT * FROM positions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        let trade_rows =
            sqlx::query("SELECT * FROM trades WHERE position_id = ? ORDER BY seq ASC")
                .bind(id.to_string())
                .fetch_all(&mut *conn)
                .await?;
        let trades = trade_rows.iter().filter_map(trade_from_row).collect();

        Ok(Some(position_from_row(&row, id, trades)))
    }

    /// Write the position row and replace its trade rows, refreshing the
    /// status cache from the derived status.
    pub(super) async fn upsert_position_conn(
        conn: &mut SqliteConnection,
        position: &Position,
    ) -> Result<(), sqlx::Error> {
        let terms = position.strategy.option_terms();
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO positions
            (id, symbol, strategy, planned_entry, planned_quantity, planned_target,
             planned_stop, thesis, strike, expiration, premium_per_contract,
             target_basis, stop_basis, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(position.id.to_string())
        .bind(position.symbol.as_str())
        .bind(strategy_to_db(&position.strategy))
        .bind(position.plan.entry_price.to_canonical_string())
        .bind(position.plan.quantity)
        .bind(position.plan.target_price.to_canonical_string())
        .bind(position.plan.stop_price.to_canonical_string())
        .bind(&position.plan.thesis)
        .bind(terms.map(|t| t.strike.to_canonical_string()))
        .bind(terms.map(|t| t.expiration.format("%Y-%m-%d").to_string()))
        .bind(terms.map(|t| t.premium_per_contract.to_canonical_string()))
        .bind(terms.map(|t| basis_to_db(t.target_basis)))
        .bind(terms.map(|t| basis_to_db(t.stop_basis)))
        .bind(position.status().to_string())
        .bind(position.created_at.as_i64())
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM trades WHERE position_id = ?")
            .bind(position.id.to_string())
            .execute(&mut *conn)
            .await?;

        for (seq, trade) in position.trades().iter().enumerate() {
            Self::insert_trade_conn(conn, trade, seq as i64).await?;
        }

        Ok(())
    }

    pub(super) async fn insert_trade_conn(
        conn: &mut SqliteConnection,
        trade: &Trade,
        seq: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO trades
            (id, position_id, seq, direction, quantity, price, executed_at, underlying,
             option_kind, option_strike, option_expiration, option_premium_per_contract,
             option_symbol, assignment_stock_position_id, assignment_cost_basis_adjustment)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trade.id.to_string())
        .bind(trade.position_id.to_string())
        .bind(seq)
        .bind(trade.direction.to_string())
        .bind(trade.quantity)
        .bind(trade.price.to_canonical_string())
        .bind(trade.executed_at.as_i64())
        .bind(trade.underlying.as_str())
        .bind(trade.option.as_ref().map(|leg| leg.kind.to_string()))
        .bind(trade.option.as_ref().map(|leg| leg.strike.to_canonical_string()))
        .bind(
            trade
                .option
                .as_ref()
                .map(|leg| leg.expiration.format("%Y-%m-%d").to_string()),
        )
        .bind(
            trade
                .option
                .as_ref()
                .map(|leg| leg.premium_per_contract.to_canonical_string()),
        )
        .bind(trade.option.as_ref().map(|leg| leg.option_symbol.clone()))
        .bind(
            trade
                .assignment
                .as_ref()
                .map(|link| link.stock_position_id.to_string()),
        )
        .bind(
            trade
                .assignment
                .as_ref()
                .map(|link| link.cost_basis_adjustment.to_canonical_string()),
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn load_trades(&self, position_id: PositionId) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM trades WHERE position_id = ? ORDER BY seq ASC")
            .bind(position_id.to_string())
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().filter_map(trade_from_row).collect())
    }
}

fn strategy_to_db(strategy: &Strategy) -> &'static str {
    match strategy {
        Strategy::StockLong => "stock_long",
        Strategy::ShortPut(_) => "short_put",
        Strategy::ShortCall(_) => "short_call",
    }
}

fn basis_to_db(basis: PriceBasis) -> &'static str {
    match basis {
        PriceBasis::Underlying => "underlying",
        PriceBasis::Premium => "premium",
    }
}

fn basis_from_db(value: Option<String>) -> PriceBasis {
    match value.as_deref() {
        Some("premium") => PriceBasis::Premium,
        Some("underlying") | None => PriceBasis::Underlying,
        Some(other) => {
            warn!(value = other, "unknown price basis, using underlying");
            PriceBasis::Underlying
        }
    }
}

fn position_from_row(row: &SqliteRow, id: PositionId, trades: Vec<Trade>) -> Position {
    let plan = TradePlan {
        entry_price: parse_decimal_col(
            &row.get::<String, _>("planned_entry"),
            "positions",
            "planned_entry",
        ),
        quantity: row.get::<i64, _>("planned_quantity"),
        target_price: parse_decimal_col(
            &row.get::<String, _>("planned_target"),
            "positions",
            "planned_target",
        ),
        stop_price: parse_decimal_col(
            &row.get::<String, _>("planned_stop"),
            "positions",
            "planned_stop",
        ),
        thesis: row.get::<String, _>("thesis"),
    };

    let strategy_str = row.get::<String, _>("strategy");
    let strategy = match strategy_str.as_str() {
        "short_put" | "short_call" => {
            let terms = OptionTerms {
                strike: parse_decimal_col(
                    &row.get::<Option<String>, _>("strike").unwrap_or_default(),
                    "positions",
                    "strike",
                ),
                expiration: parse_date_col(
                    &row.get::<Option<String>, _>("expiration").unwrap_or_default(),
                    "positions",
                    "expiration",
                ),
                premium_per_contract: parse_decimal_col(
                    &row.get::<Option<String>, _>("premium_per_contract")
                        .unwrap_or_default(),
                    "positions",
                    "premium_per_contract",
                ),
                target_basis: basis_from_db(row.get::<Option<String>, _>("target_basis")),
                stop_basis: basis_from_db(row.get::<Option<String>, _>("stop_basis")),
            };
            if strategy_str == "short_put" {
                Strategy::ShortPut(terms)
            } else {
                Strategy::ShortCall(terms)
            }
        }
        "stock_long" => Strategy::StockLong,
        other => {
            warn!(strategy = other, "unknown strategy, treating as stock long");
            Strategy::StockLong
        }
    };

    Position::from_parts(
        id,
        Symbol::new(row.get::<String, _>("symbol")),
        strategy,
        plan,
        TimeMs::new(row.get::<i64, _>("created_at")),
        trades,
    )
}

fn trade_from_row(row: &SqliteRow) -> Option<Trade> {
    let id_str = row.get::<String, _>("id");
    let Ok(id) = TradeId::from_str(&id_str) else {
        warn!(id = %id_str, "corrupt trade id, skipping row");
        return None;
    };
    let position_str = row.get::<String, _>("position_id");
    let Ok(position_id) = PositionId::from_str(&position_str) else {
        warn!(id = %id_str, "corrupt trade position id, skipping row");
        return None;
    };
    let direction_str = row.get::<String, _>("direction");
    let Ok(direction) = Direction::from_str(&direction_str) else {
        warn!(id = %id_str, direction = %direction_str, "corrupt trade direction, skipping row");
        return None;
    };

    let option = row
        .get::<Option<String>, _>("option_kind")
        .map(|kind_str| {
            let kind = match kind_str.as_str() {
                "call" => OptionKind::Call,
                _ => OptionKind::Put,
            };
            OptionLeg {
                kind,
                strike: parse_decimal_col(
                    &row.get::<Option<String>, _>("option_strike").unwrap_or_default(),
                    "trades",
                    "option_strike",
                ),
                expiration: parse_date_col(
                    &row.get::<Option<String>, _>("option_expiration")
                        .unwrap_or_default(),
                    "trades",
                    "option_expiration",
                ),
                premium_per_contract: parse_decimal_col(
                    &row.get::<Option<String>, _>("option_premium_per_contract")
                        .unwrap_or_default(),
                    "trades",
                    "option_premium_per_contract",
                ),
                option_symbol: row
                    .get::<Option<String>, _>("option_symbol")
                    .unwrap_or_default(),
            }
        });

    let assignment = row
        .get::<Option<String>, _>("assignment_stock_position_id")
        .and_then(|spawned| PositionId::from_str(&spawned).ok())
        .map(|stock_position_id| AssignmentLink {
            stock_position_id,
            cost_basis_adjustment: parse_decimal_col(
                &row.get::<Option<String>, _>("assignment_cost_basis_adjustment")
                    .unwrap_or_default(),
                "trades",
                "assignment_cost_basis_adjustment",
            ),
        });

    Some(Trade {
        id,
        position_id,
        direction,
        quantity: row.get::<i64, _>("quantity"),
        price: parse_decimal_col(&row.get::<String, _>("price"), "trades", "price"),
        executed_at: TimeMs::new(row.get::<i64, _>("executed_at")),
        underlying: Symbol::new(row.get::<String, _>("underlying")),
        option,
        assignment,
    })
}

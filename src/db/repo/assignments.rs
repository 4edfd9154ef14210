//! Atomic assignment commit and assignment-event queries.

use crate::domain::{AssignmentEvent, Position, PositionId, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use super::{parse_date_col, parse_decimal_col, Repository};

impl Repository {
    /// Commit an assignment as one transaction: both position aggregates and
    /// the link event land together or not at all.
    ///
    /// # Errors
    /// Returns an error if any write fails; nothing is visible afterwards.
    pub async fn commit_assignment(
        &self,
        option_position: &Position,
        stock_position: &Position,
        event: &AssignmentEvent,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        Self::upsert_position_conn(&mut tx, option_position).await?;
        Self::upsert_position_conn(&mut tx, stock_position).await?;

        sqlx::query(
            r#"
            INSERT INTO assignment_events
            (id, option_position_id, stock_position_id, assigned_on, contracts,
             strike, premium_per_share, cost_basis_per_share, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.option_position_id.to_string())
        .bind(event.stock_position_id.to_string())
        .bind(event.assigned_on.format("%Y-%m-%d").to_string())
        .bind(event.contracts)
        .bind(event.strike.to_canonical_string())
        .bind(event.premium_per_share.to_canonical_string())
        .bind(event.cost_basis_per_share.to_canonical_string())
        .bind(event.created_at.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Assignment events recorded against an option position, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn assignment_events_for(
        &self,
        option_position_id: PositionId,
    ) -> Result<Vec<AssignmentEvent>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM assignment_events
            WHERE option_position_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(option_position_id.to_string())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().filter_map(event_from_row).collect())
    }

    /// Every assignment event, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_assignment_events(&self) -> Result<Vec<AssignmentEvent>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM assignment_events ORDER BY created_at ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().filter_map(event_from_row).collect())
    }
}

fn event_from_row(row: &SqliteRow) -> Option<AssignmentEvent> {
    let id_str = row.get::<String, _>("id");
    let Ok(id) = Uuid::from_str(&id_str) else {
        warn!(id = %id_str, "corrupt assignment event id, skipping row");
        return None;
    };
    let option_str = row.get::<String, _>("option_position_id");
    let stock_str = row.get::<String, _>("stock_position_id");
    let (Ok(option_position_id), Ok(stock_position_id)) = (
        PositionId::from_str(&option_str),
        PositionId::from_str(&stock_str),
    ) else {
        warn!(id = %id_str, "corrupt assignment event position ids, skipping row");
        return None;
    };

    Some(AssignmentEvent {
        id,
        option_position_id,
        stock_position_id,
        assigned_on: parse_date_col(
            &row.get::<String, _>("assigned_on"),
            "assignment_events",
            "assigned_on",
        ),
        contracts: row.get::<i64, _>("contracts"),
        strike: parse_decimal_col(
            &row.get::<String, _>("strike"),
            "assignment_events",
            "strike",
        ),
        premium_per_share: parse_decimal_col(
            &row.get::<String, _>("premium_per_share"),
            "assignment_events",
            "premium_per_share",
        ),
        cost_basis_per_share: parse_decimal_col(
            &row.get::<String, _>("cost_basis_per_share"),
            "assignment_events",
            "cost_basis_per_share",
        ),
        created_at: TimeMs::new(row.get::<i64, _>("created_at")),
    })
}

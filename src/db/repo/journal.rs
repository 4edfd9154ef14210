//! Journal entry linkage. The ledger stores ids and free text, nothing more.

use crate::domain::{JournalEntry, PositionId, TimeMs, TradeId};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use super::Repository;

impl Repository {
    /// Persist a journal entry.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, position_id, trade_id, body, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.position_id.to_string())
        .bind(entry.trade_id.map(|t| t.to_string()))
        .bind(&entry.body)
        .bind(entry.created_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Journal entries for a position, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_journal_entries(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<JournalEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM journal_entries
            WHERE position_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(position_id.to_string())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let id_str = row.get::<String, _>("id");
                let Ok(id) = Uuid::from_str(&id_str) else {
                    warn!(id = %id_str, "corrupt journal entry id, skipping row");
                    return None;
                };
                Some(JournalEntry {
                    id,
                    position_id,
                    trade_id: row
                        .get::<Option<String>, _>("trade_id")
                        .and_then(|t| TradeId::from_str(&t).ok()),
                    body: row.get::<String, _>("body"),
                    created_at: TimeMs::new(row.get::<i64, _>("created_at")),
                })
            })
            .collect())
    }
}

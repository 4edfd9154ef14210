//! Journal entry: free text linked to a position (and optionally a trade).
//! The ledger stores and returns entries; it never interprets their content.

use crate::domain::{PositionId, TimeMs, TradeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub position_id: PositionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<TradeId>,
    pub body: String,
    pub created_at: TimeMs,
}

impl JournalEntry {
    pub fn new(
        position_id: PositionId,
        trade_id: Option<TradeId>,
        body: String,
        created_at: TimeMs,
    ) -> Self {
        JournalEntry {
            id: Uuid::new_v4(),
            position_id,
            trade_id,
            body,
            created_at,
        }
    }
}

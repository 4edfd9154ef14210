//! Assignment event: the persisted link between an assigned option position
//! and the stock position it spawned. Written exactly once, immutable after.

use crate::domain::{Decimal, PositionId, TimeMs};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEvent {
    pub id: Uuid,
    pub option_position_id: PositionId,
    pub stock_position_id: PositionId,
    pub assigned_on: NaiveDate,
    pub contracts: i64,
    pub strike: Decimal,
    /// Premium received, per share of the resulting stock position.
    pub premium_per_share: Decimal,
    /// Effective cost basis per share: strike minus premium per share.
    pub cost_basis_per_share: Decimal,
    pub created_at: TimeMs,
}

impl AssignmentEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        option_position_id: PositionId,
        stock_position_id: PositionId,
        assigned_on: NaiveDate,
        contracts: i64,
        strike: Decimal,
        premium_per_share: Decimal,
        cost_basis_per_share: Decimal,
        created_at: TimeMs,
    ) -> Self {
        AssignmentEvent {
            id: Uuid::new_v4(),
            option_position_id,
            stock_position_id,
            assigned_on,
            contracts,
            strike,
            premium_per_share,
            cost_basis_per_share,
            created_at,
        }
    }
}

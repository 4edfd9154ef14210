use crate::api::positions::load_position;
use crate::api::AppState;
use crate::domain::{JournalEntry, PositionId, TimeMs, TradeId, ValidationError};
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub position_id: Uuid,
    pub trade_id: Option<Uuid>,
    pub body: String,
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    if req.body.trim().is_empty() {
        return Err(ValidationError::new("body", "\"\"", "must not be empty").into());
    }
    // The entry must point at a real position; the content itself is opaque.
    let position = load_position(&state, req.position_id).await?;

    if let Some(trade_id) = req.trade_id {
        let known = position
            .trades()
            .iter()
            .any(|t| t.id == TradeId(trade_id));
        if !known {
            return Err(AppError::NotFound(format!(
                "trade {} on position {}",
                trade_id, req.position_id
            )));
        }
    }

    let entry = JournalEntry::new(
        PositionId(req.position_id),
        req.trade_id.map(TradeId),
        req.body,
        TimeMs::new(Utc::now().timestamp_millis()),
    );
    state.repo.insert_journal_entry(&entry).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
    pub position_id: Uuid,
}

pub async fn list_entries(
    Query(params): Query<ListEntriesQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let entries = state
        .repo
        .list_journal_entries(PositionId(params.position_id))
        .await?;
    Ok(Json(entries))
}

use crate::api::positions::{position_dto, PositionDto};
use crate::api::AppState;
use crate::domain::{AssignmentEvent, PositionId, TimeMs};
use crate::error::AppError;
use crate::orchestration::{AssignmentPreview, CompleteAssignment};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewAssignmentRequest {
    pub option_position_id: Uuid,
    pub contracts: Option<i64>,
    /// Assignment date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

pub async fn preview_assignment(
    State(state): State<AppState>,
    Json(req): Json<PreviewAssignmentRequest>,
) -> Result<Json<AssignmentPreview>, AppError> {
    let today = req.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let preview = state
        .orchestrator
        .preview(PositionId(req.option_position_id), req.contracts, today)
        .await?;
    Ok(Json(preview))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAssignmentRequest {
    pub option_position_id: Uuid,
    pub contracts: Option<i64>,
    pub assigned_on: Option<NaiveDate>,
    /// Thesis for the spawned stock position.
    #[serde(default)]
    pub thesis: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAssignmentResponse {
    pub option_position: PositionDto,
    pub stock_position: PositionDto,
    pub event: AssignmentEvent,
}

pub async fn complete_assignment(
    State(state): State<AppState>,
    Json(req): Json<CompleteAssignmentRequest>,
) -> Result<(StatusCode, Json<CompleteAssignmentResponse>), AppError> {
    let outcome = state
        .orchestrator
        .complete(CompleteAssignment {
            option_position_id: PositionId(req.option_position_id),
            contracts: req.contracts,
            assigned_on: req.assigned_on.unwrap_or_else(|| Utc::now().date_naive()),
            thesis: req.thesis,
            executed_at: TimeMs::new(Utc::now().timestamp_millis()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CompleteAssignmentResponse {
            option_position: position_dto(&outcome.option_position),
            stock_position: position_dto(&outcome.stock_position),
            event: outcome.event,
        }),
    ))
}

pub async fn list_position_events(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentEvent>>, AppError> {
    let events = state
        .repo
        .assignment_events_for(PositionId(id))
        .await?;
    Ok(Json(events))
}

use crate::api::positions::load_position;
use crate::api::AppState;
use crate::domain::Decimal;
use crate::engine::{process_fifo_grouped, review_plan, PlanReview, PositionReport, PositionStatus};
use crate::error::AppError;
use crate::prices::resolve_marks;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    /// Mark price override applied to every instrument group.
    pub mark: Option<String>,
    /// Value as of this date (YYYY-MM-DD); defaults to the latest close.
    pub on: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub position_id: Uuid,
    pub status: PositionStatus,
    /// Rounded to two decimals for display; the report carries exact values.
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub fully_closed: bool,
    pub report: PositionReport,
}

pub async fn get_performance(
    Path(id): Path<Uuid>,
    Query(params): Query<PerformanceQuery>,
    State(state): State<AppState>,
) -> Result<Json<PerformanceResponse>, AppError> {
    let position = load_position(&state, id).await?;

    let instruments: Vec<String> = {
        let mut seen = Vec::new();
        for trade in position.trades() {
            let key = trade.instrument().to_string();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen
    };

    let marks: HashMap<String, Decimal> = match params.mark.as_deref() {
        Some(raw) => {
            let mark = Decimal::from_str_canonical(raw)
                .map_err(|_| AppError::BadRequest(format!("invalid mark price: {}", raw)))?;
            instruments.iter().map(|i| (i.clone(), mark)).collect()
        }
        None => resolve_marks(state.prices.as_ref(), &instruments, params.on).await?,
    };

    let report = process_fifo_grouped(position.trades(), &marks);

    Ok(Json(PerformanceResponse {
        position_id: id,
        status: position.status(),
        realized_pnl: report.realized_pnl.two_dp(),
        unrealized_pnl: report.unrealized_pnl.two_dp(),
        total_pnl: report.total_pnl.two_dp(),
        fully_closed: report.fully_closed,
        report,
    }))
}

pub async fn get_review(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PlanReview>, AppError> {
    let position = load_position(&state, id).await?;

    let status = position.status();
    if status != PositionStatus::Closed {
        return Err(AppError::Conflict(format!(
            "plan review requires a closed position; status is {}",
            status
        )));
    }

    let report = process_fifo_grouped(position.trades(), &HashMap::new());
    Ok(Json(review_plan(
        &position,
        &report,
        state.config.review_tolerance,
    )))
}

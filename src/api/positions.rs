use crate::api::AppState;
use crate::domain::{
    Decimal, Direction, OptionLeg, Position, PositionId, Strategy, Symbol, TimeMs, Trade,
    TradePlan, ValidationError,
};
use crate::engine::{process_fifo_grouped, review_plan, PlanReview, PositionStatus};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    pub symbol: String,
    pub strategy: Strategy,
    pub plan: TradePlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDto {
    pub id: Uuid,
    pub direction: Direction,
    pub quantity: i64,
    pub price: Decimal,
    pub executed_at: i64,
    pub instrument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned_position_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub id: Uuid,
    pub symbol: String,
    pub strategy: Strategy,
    pub plan: TradePlan,
    pub status: PositionStatus,
    pub net_quantity: i64,
    pub created_at: i64,
    pub trades: Vec<TradeDto>,
}

pub(crate) fn position_dto(position: &Position) -> PositionDto {
    PositionDto {
        id: position.id.as_uuid(),
        symbol: position.symbol.as_str().to_string(),
        strategy: position.strategy.clone(),
        plan: position.plan.clone(),
        status: position.status(),
        net_quantity: position.net_quantity(),
        created_at: position.created_at.as_i64(),
        trades: position
            .trades()
            .iter()
            .map(|t| TradeDto {
                id: t.id.as_uuid(),
                direction: t.direction,
                quantity: t.quantity,
                price: t.price,
                executed_at: t.executed_at.as_i64(),
                instrument: t.instrument().to_string(),
                option_symbol: t.option.as_ref().map(|leg| leg.option_symbol.clone()),
                spawned_position_id: t
                    .assignment
                    .as_ref()
                    .map(|link| link.stock_position_id.as_uuid()),
            })
            .collect(),
    }
}

pub async fn create_position(
    State(state): State<AppState>,
    Json(req): Json<CreatePositionRequest>,
) -> Result<(StatusCode, Json<PositionDto>), AppError> {
    if req.symbol.trim().is_empty() {
        return Err(ValidationError::new("symbol", "\"\"", "must not be empty").into());
    }
    if req.plan.quantity <= 0 {
        return Err(ValidationError::new(
            "plan.quantity",
            req.plan.quantity,
            "must be a positive integer",
        )
        .into());
    }
    if let Some(terms) = req.strategy.option_terms() {
        if !terms.strike.is_positive() {
            return Err(
                ValidationError::new("strategy.option.strike", terms.strike, "must be positive")
                    .into(),
            );
        }
        if terms.premium_per_contract.is_negative() {
            return Err(ValidationError::new(
                "strategy.option.premiumPerContract",
                terms.premium_per_contract,
                "must not be negative",
            )
            .into());
        }
    }

    let position = Position::new(
        Symbol::new(req.symbol.trim().to_string()),
        req.strategy,
        req.plan,
        TimeMs::new(Utc::now().timestamp_millis()),
    );
    state.repo.create_position(&position).await?;

    Ok((StatusCode::CREATED, Json(position_dto(&position))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPositionsQuery {
    pub status: Option<String>,
}

pub async fn list_positions(
    Query(params): Query<ListPositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PositionDto>>, AppError> {
    let status_filter = match params.status.as_deref() {
        Some(raw) => Some(
            PositionStatus::from_str(raw)
                .map_err(|_| AppError::BadRequest(format!("invalid status filter: {}", raw)))?,
        ),
        None => None,
    };

    let positions = state.repo.list_positions().await?;
    let dtos = positions
        .iter()
        .filter(|p| status_filter.map_or(true, |s| p.status() == s))
        .map(position_dto)
        .collect();
    Ok(Json(dtos))
}

pub async fn get_position(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PositionDto>, AppError> {
    let position = load_position(&state, id).await?;
    Ok(Json(position_dto(&position)))
}

pub async fn delete_position(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let deleted = state.repo.delete_position(PositionId(id)).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("position {}", id)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub plan: TradePlan,
}

/// Revise the plan half of a position. The trade log and strategy are
/// untouched; only what the trader intended changes.
pub async fn update_plan(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<UpdatePlanRequest>,
) -> Result<Json<PositionDto>, AppError> {
    if req.plan.quantity <= 0 {
        return Err(ValidationError::new(
            "plan.quantity",
            req.plan.quantity,
            "must be a positive integer",
        )
        .into());
    }

    let mut position = load_position(&state, id).await?;
    position.plan = req.plan;
    state.repo.update_position(&position).await?;
    Ok(Json(position_dto(&position)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendTradeRequest {
    pub direction: Direction,
    pub quantity: i64,
    pub price: Decimal,
    /// Milliseconds since epoch; defaults to now.
    pub executed_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendTradeResponse {
    pub position: PositionDto,
    pub status: PositionStatus,
    /// Present exactly when this append closed the position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<PlanReview>,
}

pub async fn append_trade(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<AppendTradeRequest>,
) -> Result<Json<AppendTradeResponse>, AppError> {
    let position_id = PositionId(id);
    let current = load_position(&state, id).await?;

    let executed_at = TimeMs::new(
        req.executed_at
            .unwrap_or_else(|| Utc::now().timestamp_millis()),
    );
    let mut trade = Trade::new(
        position_id,
        req.direction,
        req.quantity,
        req.price,
        executed_at,
        current.symbol.clone(),
    );
    // Option-strategy trades inherit the position's contract.
    if let (Some(terms), Some(kind)) = (
        current.strategy.option_terms(),
        current.strategy.option_kind(),
    ) {
        trade = trade.with_option_leg(OptionLeg::new(
            &current.symbol,
            kind,
            terms.strike,
            terms.expiration,
            terms.premium_per_contract,
        ));
    }

    let (position, status) = state.repo.append_trade(position_id, trade).await?;

    let review = if status == PositionStatus::Closed {
        let report = process_fifo_grouped(position.trades(), &HashMap::new());
        Some(review_plan(&position, &report, state.config.review_tolerance))
    } else {
        None
    };

    Ok(Json(AppendTradeResponse {
        position: position_dto(&position),
        status,
        review,
    }))
}

pub(crate) async fn load_position(state: &AppState, id: Uuid) -> Result<Position, AppError> {
    state
        .repo
        .get_position(PositionId(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("position {}", id)))
}

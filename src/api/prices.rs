use crate::api::AppState;
use crate::domain::{Decimal, Symbol, ValidationError};
use crate::error::AppError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPriceRequest {
    pub symbol: String,
    pub day: NaiveDate,
    pub close: Decimal,
}

pub async fn upsert_price(
    State(state): State<AppState>,
    Json(req): Json<UpsertPriceRequest>,
) -> Result<StatusCode, AppError> {
    if req.symbol.trim().is_empty() {
        return Err(ValidationError::new("symbol", "\"\"", "must not be empty").into());
    }
    if req.close.is_negative() {
        return Err(
            ValidationError::new("close", req.close, "must not be negative").into(),
        );
    }

    state
        .repo
        .upsert_price(&Symbol::new(req.symbol.trim().to_string()), req.day, req.close)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::AppendTradeError;
use crate::domain::ValidationError;
use crate::orchestration::AssignmentError;
use crate::prices::PriceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<PriceError> for AppError {
    fn from(err: PriceError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AppendTradeError> for AppError {
    fn from(err: AppendTradeError) -> Self {
        match err {
            AppendTradeError::NotFound(id) => AppError::NotFound(format!("position {}", id)),
            AppendTradeError::Validation(v) => AppError::Validation(v),
            AppendTradeError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::NotFound(id) => AppError::NotFound(format!("position {}", id)),
            AssignmentError::Validation(v) => AppError::Validation(v),
            AssignmentError::Transaction(e) => {
                AppError::Internal(format!("assignment transaction failed: {}", e))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(v) => {
                let body = Json(json!({
                    "error": v.to_string(),
                    "field": v.field,
                    "value": v.value,
                    "constraint": v.constraint,
                    "remediation": v.remediation,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg),
            AppError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => error_response(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = Json(json!({
        "error": message,
    }));
    (status, body).into_response()
}

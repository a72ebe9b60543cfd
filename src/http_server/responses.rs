//! Shared response bodies

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::billing::BillingRecord;
use crate::tiering::{Tier, TieringError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BillingResponse {
    pub success: bool,
    pub data: BillingRecord,
    pub message: String,
    pub source: Tier,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

impl From<TieringError> for ErrorResponse {
    fn from(e: TieringError) -> Self {
        Self {
            error: e.to_string(),
            code: e.code().to_string(),
        }
    }
}

pub fn tiering_error(e: TieringError) -> ApiError {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(e)))
}

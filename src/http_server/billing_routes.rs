//! Billing record HTTP Routes
//!
//! Reads resolve across tiers; writes go to the hot tier only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::responses::{api_error, tiering_error, ApiError, BillingResponse, MessageResponse};
use super::state::AppState;
use crate::billing::{timestamp, BillingPatch, BillingRecord, BillingStatus};
use crate::tiering::Tier;

/// Body of `POST /billing`; `id` and `created_at` are filled in when absent
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBillingRequest {
    #[serde(default)]
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<BillingStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub due_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CreateBillingRequest {
    pub fn into_record(self) -> BillingRecord {
        let mut record = BillingRecord::new(self.id, self.customer_id, self.amount, 0);
        if let Some(currency) = self.currency {
            record.currency = currency;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(created_at) = self.created_at {
            record.created_at = created_at;
        }
        record.description = self.description;
        record.due_date = self.due_date;
        record.paid_at = self.paid_at;
        record.metadata = self.metadata;
        record
    }
}

pub fn billing_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/billing", axum::routing::post(create_billing_handler))
        .route(
            "/billing/:id",
            get(get_billing_handler)
                .put(update_billing_handler)
                .delete(delete_billing_handler),
        )
        .with_state(state)
}

async fn get_billing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BillingResponse>, ApiError> {
    let resolved = state.engine.resolve_record(&id).map_err(tiering_error)?;

    Ok(Json(BillingResponse {
        success: true,
        data: resolved.record,
        message: "Billing record retrieved successfully".to_string(),
        source: resolved.source,
    }))
}

async fn create_billing_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<BillingResponse>), ApiError> {
    let request: CreateBillingRequest = serde_json::from_value(body).map_err(|e| {
        api_error(StatusCode::BAD_REQUEST, "BILLVAULT_INVALID_RECORD", e.to_string())
    })?;
    let record = state
        .engine
        .create_record(request.into_record())
        .map_err(tiering_error)?;

    Ok((
        StatusCode::CREATED,
        Json(BillingResponse {
            success: true,
            data: record,
            message: "Billing record created successfully".to_string(),
            source: Tier::Primary,
        }),
    ))
}

async fn update_billing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<BillingResponse>, ApiError> {
    let patch = BillingPatch::from_json(body).map_err(|e| tiering_error(e.into()))?;
    let record = state.engine.update_record(&id, &patch).map_err(tiering_error)?;

    Ok(Json(BillingResponse {
        success: true,
        data: record,
        message: "Billing record updated successfully".to_string(),
        source: Tier::Primary,
    }))
}

async fn delete_billing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.engine.delete_record(&id).map_err(tiering_error)?;
    if !removed {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "BILLVAULT_NOT_FOUND",
            "Billing record not found",
        ));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Billing record deleted successfully".to_string(),
    }))
}

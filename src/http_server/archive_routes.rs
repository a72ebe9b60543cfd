//! Archival HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::responses::{api_error, ApiError, MessageResponse};
use super::state::AppState;
use crate::observability::{Event, Logger};
use crate::tiering::{ArchiveOutcome, StatsReport};

pub fn archive_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/archive", post(archive_background_handler))
        .route("/archive/sync", post(archive_sync_handler))
        .route("/restore/:id", post(restore_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Start a run and return without waiting for it
async fn archive_background_handler(State(state): State<Arc<AppState>>) -> Json<ArchiveOutcome> {
    let engine = Arc::clone(&state.engine);
    tokio::spawn(async move {
        if let Err(e) = tokio::task::spawn_blocking(move || engine.archive_old_records()).await {
            let reason = e.to_string();
            Logger::emit(Event::ArchiveTaskFailed, &[("reason", reason.as_str())]);
        }
    });
    Json(ArchiveOutcome::started())
}

async fn archive_sync_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ArchiveOutcome>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.archive_old_records())
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "BILLVAULT_ARCHIVE_TASK_FAILED",
                e.to_string(),
            )
        })?;
    Ok(Json(outcome))
}

async fn restore_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.engine.restore_record(&id) {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "BILLVAULT_NOT_FOUND",
            format!("Record {} not found in archive or restore failed", id),
        ));
    }
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Record {} restored successfully", id),
    }))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Response {
    let report = state.engine.get_stats();
    let status = if report.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json::<StatsReport>(report)).into_response()
}

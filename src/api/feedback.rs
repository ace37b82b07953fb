use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::info;

use crate::api::ApiError;
use crate::app::AppState;
use crate::store::models::FeedbackUpdate;

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackResponse {
    status: &'static str,
}

/// POST /add_feedback
///
/// Overwrites `human_eval` and `human_feedback` on one record.
pub(crate) async fn add_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackUpdate>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(update) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let id = update.id;

    match state.dao().update_feedback(update).await? {
        Some(_) => {
            state.telemetry().metrics().feedback_updates.inc();
            info!(%id, "human feedback updated");
            Ok(Json(FeedbackResponse { status: "success" }))
        }
        None => Err(ApiError::NotFound(format!("test result {id} not found"))),
    }
}

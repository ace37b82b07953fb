use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{error, info};

use crate::api::ApiError;
use crate::app::AppState;
use crate::pipeline::SummaryOutcome;

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    summary: String,
}

/// GET /summarize
///
/// Clusters stored human feedback and returns one summary per cluster, joined.
pub(crate) async fn summarize(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let outcome = state.pipeline().run().await.map_err(|error| {
        error!(error = %error, "feedback summarization failed");
        ApiError::Internal(error.into())
    })?;

    match &outcome {
        SummaryOutcome::Summary(_) => info!("feedback summary returned"),
        SummaryOutcome::NoFeedback => info!("no valid human feedback to summarize"),
        SummaryOutcome::NoSummary => info!("all clusters were empty; returning empty summary"),
    }

    Ok(Json(SummaryResponse {
        summary: outcome.as_response_text().to_string(),
    }))
}

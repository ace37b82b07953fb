mod error;
pub(crate) mod feedback;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod summarize;
pub(crate) mod test_results;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) use self::error::ApiError;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route(
            "/test_results",
            get(test_results::list).post(test_results::create),
        )
        .route(
            "/test_results/",
            get(test_results::list).post(test_results::create),
        )
        .route("/add_feedback", post(feedback::add_feedback))
        .route("/add_feedback/", post(feedback::add_feedback))
        .route("/summarize", get(summarize::summarize))
        .route("/summarize/", get(summarize::summarize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use crate::api::ApiError;
use crate::app::AppState;
use crate::store::models::{NewTestResult, Page, PageRequest, TestResult};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

impl PageParams {
    /// Applies the configured default and cap; zero values fall back to 1.
    fn resolve(&self, default_page_size: u32, max_page_size: u32) -> PageRequest {
        let page_size = self
            .page_size
            .unwrap_or(default_page_size)
            .min(max_page_size);
        PageRequest::new(self.page.unwrap_or(1), page_size)
    }
}

/// GET /test_results
pub(crate) async fn list(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<TestResult>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let config = state.config();
    let request = params.resolve(config.default_page_size(), config.max_page_size());

    let page = state.dao().list_page(request).await?;
    info!(
        page = page.page,
        page_size = page.page_size,
        returned = page.results.len(),
        total_count = page.total_count,
        "listed test results"
    );
    Ok(Json(page))
}

/// POST /test_results
pub(crate) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewTestResult>, JsonRejection>,
) -> Result<(StatusCode, Json<TestResult>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let created = state.dao().create(payload).await?;
    state.telemetry().metrics().test_results_created.inc();
    info!(id = %created.id, "test result created");
    Ok((StatusCode::CREATED, Json(created)))
}

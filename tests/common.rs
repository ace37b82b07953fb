#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use feedback_recap::app::{ComponentRegistry, build_router};
use feedback_recap::clients::TextGenerator;
use feedback_recap::config::Config;
use feedback_recap::observability::Telemetry;
use feedback_recap::store::dao::{InMemoryTestResultDao, TestResultDao};
use http_body_util::BodyExt;

/// Memory-backed configuration with a fixed clustering seed.
pub fn test_config(gemini_base_url: &str) -> Config {
    temp_env::with_vars(
        [
            ("FEEDBACK_STORE", Some("memory")),
            ("GEMINI_API_KEY", Some("integration-key")),
            ("GEMINI_MODEL", Some("gemini-test")),
            ("GEMINI_BASE_URL", Some(gemini_base_url)),
            ("CLUSTER_SEED", Some("17")),
            ("LLM_TIMEOUT_SECS", Some("5")),
            ("DEFAULT_PAGE_SIZE", None),
            ("MAX_PAGE_SIZE", None),
            ("SUMMARY_MAX_CLUSTERS", None),
        ],
        || Config::from_env().expect("config loads"),
    )
}

pub fn router_with(dao: Arc<InMemoryTestResultDao>, generator: Arc<dyn TextGenerator>) -> Router {
    let dao: Arc<dyn TestResultDao> = dao;
    let registry = ComponentRegistry::from_parts(
        test_config("http://localhost:1/"),
        Telemetry::without_tracing().expect("telemetry"),
        dao,
        generator,
    );
    build_router(registry)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

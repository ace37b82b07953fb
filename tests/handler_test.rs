mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use feedback_recap::store::dao::{InMemoryTestResultDao, TestResultDao};
use feedback_recap::store::models::{NewTestResult, PageRequest};
use feedback_recap::test_support::ScriptedGenerator;
use tower::ServiceExt;

use common::{body_json, get, post_json, router_with};

fn record(n: usize) -> NewTestResult {
    NewTestResult {
        input_under_test: format!("Test input {n}"),
        llm_output: format!("Test output {n}"),
        criteria: format!("Criteria {n}"),
        auto_eval: 3,
        auto_feedback: format!("Auto feedback {n}"),
        human_eval: Some(4),
        human_feedback: Some(format!("Human feedback {n}")),
    }
}

#[tokio::test]
async fn test_results_returns_results_and_total_count() {
    let dao = Arc::new(InMemoryTestResultDao::new());
    dao.create(record(1)).await.expect("create");
    dao.create(record(2)).await.expect("create");
    let router = router_with(dao, Arc::new(ScriptedGenerator::replying(["unused"])));

    let response = router.oneshot(get("/test_results")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await;
    assert_eq!(data["total_count"], 2);
    assert_eq!(data["results"].as_array().expect("results array").len(), 2);
    assert_eq!(data["results"][0]["input_under_test"], "Test input 1");
    assert_eq!(data["page"], 1);
    assert_eq!(data["page_size"], 10);
}

#[tokio::test]
async fn test_results_paginates_and_caps_page_size() {
    let dao = Arc::new(InMemoryTestResultDao::new());
    for n in 0..12 {
        dao.create(record(n)).await.expect("create");
    }
    let router = router_with(dao, Arc::new(ScriptedGenerator::replying(["unused"])));

    let response = router
        .clone()
        .oneshot(get("/test_results/?page=2&page_size=5"))
        .await
        .expect("response");
    let data = body_json(response).await;
    assert_eq!(data["results"].as_array().expect("array").len(), 5);
    assert_eq!(data["results"][0]["input_under_test"], "Test input 5");
    assert_eq!(data["total_pages"], 3);

    let response = router
        .oneshot(get("/test_results?page_size=5000"))
        .await
        .expect("response");
    let data = body_json(response).await;
    assert_eq!(data["page_size"], 100);
    assert_eq!(data["results"].as_array().expect("array").len(), 12);
}

#[tokio::test]
async fn test_results_rejects_malformed_query() {
    let router = router_with(
        Arc::new(InMemoryTestResultDao::new()),
        Arc::new(ScriptedGenerator::replying(["unused"])),
    );
    let response = router
        .oneshot(get("/test_results?page=first"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn create_test_result_assigns_id() {
    let dao = Arc::new(InMemoryTestResultDao::new());
    let router = router_with(dao.clone(), Arc::new(ScriptedGenerator::replying(["unused"])));

    let response = router
        .oneshot(post_json(
            "/test_results",
            &serde_json::json!({
                "input_under_test": "2+2?",
                "llm_output": "4",
                "criteria": "correctness",
                "auto_eval": 5,
                "auto_feedback": "correct"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created["human_feedback"].is_null());
    assert_eq!(dao.list_human_feedback().await.expect("list").len(), 1);
}

#[tokio::test]
async fn add_feedback_updates_record() {
    let dao = Arc::new(InMemoryTestResultDao::new());
    let created = dao.create(record(1)).await.expect("create");
    let router = router_with(dao.clone(), Arc::new(ScriptedGenerator::replying(["unused"])));

    let response = router
        .oneshot(post_json(
            "/add_feedback",
            &serde_json::json!({
                "id": created.id,
                "human_eval": 1,
                "human_feedback": "Updated human feedback"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    let feedback = dao.list_human_feedback().await.expect("list");
    assert_eq!(feedback, vec![Some("Updated human feedback".to_string())]);
}

#[tokio::test]
async fn add_feedback_accepts_blank_score_from_form() {
    let dao = Arc::new(InMemoryTestResultDao::new());
    let created = dao.create(record(1)).await.expect("create");
    let router = router_with(dao.clone(), Arc::new(ScriptedGenerator::replying(["unused"])));

    let response = router
        .oneshot(post_json(
            "/add_feedback/",
            &serde_json::json!({
                "id": created.id,
                "human_eval": "",
                "human_feedback": "nice"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    let page = dao
        .list_page(PageRequest::new(1, 10))
        .await
        .expect("page");
    assert_eq!(page.results[0].human_feedback.as_deref(), Some("nice"));
    assert_eq!(page.results[0].human_eval, None);
}

#[tokio::test]
async fn add_feedback_unknown_id_is_not_found() {
    let router = router_with(
        Arc::new(InMemoryTestResultDao::new()),
        Arc::new(ScriptedGenerator::replying(["unused"])),
    );
    let response = router
        .oneshot(post_json(
            "/add_feedback",
            &serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "human_feedback": "orphan"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn add_feedback_rejects_missing_id() {
    let router = router_with(
        Arc::new(InMemoryTestResultDao::new()),
        Arc::new(ScriptedGenerator::replying(["unused"])),
    );
    let response = router
        .oneshot(post_json(
            "/add_feedback",
            &serde_json::json!({"human_feedback": "no id"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn live_probe_reports_live() {
    let router = router_with(
        Arc::new(InMemoryTestResultDao::new()),
        Arc::new(ScriptedGenerator::replying(["unused"])),
    );
    let response = router.oneshot(get("/health/live")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "live");
}

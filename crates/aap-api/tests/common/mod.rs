#![allow(dead_code)]

use aap_api::service::AssessmentService;
use aap_api::state::AppState;
use aap_auth::jwt::TokenVerifier;
use aap_storage::store::EventStore;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn app() -> Router {
    aap_api::router(AppState::new(
        AssessmentService::new(EventStore::memory()),
        None,
    ))
}

pub fn app_with_auth(verifier: TokenVerifier) -> Router {
    aap_api::router(AppState::new(
        AssessmentService::new(EventStore::memory()),
        Some(verifier),
    ))
}

pub fn user() -> Value {
    json!({ "id": "test-user", "name": "Test User" })
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Run one command batch; returns the per-command results.
pub async fn commands(app: &Router, commands: Vec<Value>) -> Vec<Value> {
    let (status, body) = post(app, "/command", json!({ "commands": commands })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["result"].clone())
        .collect()
}

/// Run one query; returns `{request, result}`.
pub async fn query(app: &Router, query: Value) -> Value {
    let (status, body) = post(app, "/query", json!({ "queries": [query] })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["queries"][0].clone()
}

pub async fn create_assessment(app: &Router) -> String {
    let results = commands(
        app,
        vec![json!({
            "type": "CreateAssessmentCommand",
            "formVersion": "1.0",
            "properties": {},
            "user": user(),
        })],
    )
    .await;
    assert_eq!(results[0]["success"], true, "{}", results[0]);
    results[0]["assessmentUuid"].as_str().unwrap().to_string()
}

pub fn update_answers(assessment_uuid: &str, key: &str, value: &str) -> Value {
    let mut added = serde_json::Map::new();
    added.insert(key.to_string(), json!([value]));
    json!({
        "type": "UpdateAssessmentAnswersCommand",
        "assessmentUuid": assessment_uuid,
        "added": added,
        "removed": [],
        "user": user(),
    })
}

pub async fn latest(app: &Router, assessment_uuid: &str) -> Value {
    query(
        app,
        json!({
            "type": "AssessmentVersionQuery",
            "user": user(),
            "assessmentIdentifier": { "type": "UUID", "uuid": assessment_uuid },
        }),
    )
    .await["result"]
        .clone()
}

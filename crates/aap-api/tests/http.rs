mod common;

use std::time::{SystemTime, UNIX_EPOCH};

use aap_auth::jwt::TokenVerifier;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use common::{app, app_with_auth, post, send, user};

const SECRET: &[u8] = b"api-test-secret";

fn token(authorities: &[&str]) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 300;
    encode(
        &Header::default(),
        &json!({ "client_id": "aap-ui", "authorities": authorities, "exp": exp }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

fn create_body() -> Value {
    json!({
        "commands": [{
            "type": "CreateAssessmentCommand",
            "formVersion": "1.0",
            "user": user(),
        }]
    })
}

fn command_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/command")
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(create_body().to_string())).unwrap()
}

#[tokio::test]
async fn health_is_up() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "UP" }));
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app_with_auth(TokenVerifier::hs256(SECRET));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = app_with_auth(TokenVerifier::hs256(SECRET));
    let (status, body) = send(&app, command_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("bearer"));
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = app_with_auth(TokenVerifier::hs256(SECRET));
    let (status, _) = send(&app, command_request(Some("Bearer not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_is_accepted() {
    let app = app_with_auth(TokenVerifier::hs256(SECRET));
    let bearer = format!("Bearer {}", token(&[]));
    let (status, body) = send(&app, command_request(Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commands"][0]["result"]["success"], true);
}

#[tokio::test]
async fn missing_role_is_forbidden() {
    let app = app_with_auth(
        TokenVerifier::hs256(SECRET).with_required_role("ROLE_AAP__COORDINATOR_RW"),
    );

    let bearer = format!("Bearer {}", token(&["ROLE_OTHER"]));
    let (status, _) = send(&app, command_request(Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let bearer = format!("Bearer {}", token(&["ROLE_AAP__COORDINATOR_RW"]));
    let (status, _) = send(&app, command_request(Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/command")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post(&app, "/command", json!({ "commands": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/query", json!({ "something": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_batches_are_fine() {
    let app = app();
    let (status, body) = post(&app, "/command", json!({ "commands": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "commands": [] }));

    let (status, body) = post(&app, "/query", json!({ "queries": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "queries": [] }));
}

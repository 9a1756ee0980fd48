mod common;

use serde_json::{json, Value};

use common::{app, commands, create_assessment, latest, query, update_answers, user};

async fn version_at(app: &axum::Router, uuid: &str, time_stamp: &Value) -> Value {
    query(
        app,
        json!({
            "type": "AssessmentVersionQuery",
            "user": user(),
            "assessmentIdentifier": { "type": "UUID", "uuid": uuid },
            "timeStamp": time_stamp,
        }),
    )
    .await["result"]
        .clone()
}

async fn update(app: &axum::Router, uuid: &str, value: &str) {
    let results = commands(app, vec![update_answers(uuid, "test_addition", value)]).await;
    assert_eq!(results[0]["success"], true, "{}", results[0]);
}

#[tokio::test]
async fn point_in_time_query_reconstructs_the_captured_state() {
    let app = app();
    let uuid = create_assessment(&app).await;

    for i in 1..=48 {
        update(&app, &uuid, &format!("Loop Iteration {i}")).await;
    }
    let captured = latest(&app, &uuid).await;
    let time_stamp = captured["updatedAt"].clone();

    update(&app, &uuid, "Loop Iteration 49").await;
    let after_49 = latest(&app, &uuid).await["aggregateUuid"].clone();
    update(&app, &uuid, "Loop Iteration 50").await;
    let after_50 = latest(&app, &uuid).await["aggregateUuid"].clone();

    let pit = version_at(&app, &uuid, &time_stamp).await;
    assert_eq!(pit["type"], "AssessmentVersionQueryResult");
    assert_eq!(pit["answers"]["test_addition"], json!(["Loop Iteration 48"]));
    assert_eq!(pit["aggregateUuid"], captured["aggregateUuid"]);
    assert_ne!(pit["aggregateUuid"], after_49);
    assert_ne!(pit["aggregateUuid"], after_50);

    // Same query again, same answer.
    let again = version_at(&app, &uuid, &time_stamp).await;
    assert_eq!(again["aggregateUuid"], pit["aggregateUuid"]);
    assert_eq!(again["answers"], pit["answers"]);
}

#[tokio::test]
async fn cutoff_before_creation_returns_the_created_state() {
    let app = app();
    let uuid = create_assessment(&app).await;
    update(&app, &uuid, "later").await;

    let pit = version_at(&app, &uuid, &json!("2000-01-01T00:00:00.000000")).await;
    assert_eq!(pit["type"], "AssessmentVersionQueryResult");
    assert_eq!(pit["answers"], json!({}));
}

#[tokio::test]
async fn malformed_cutoff_is_a_failed_query() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let pit = version_at(&app, &uuid, &json!("yesterday at noon")).await;
    assert_eq!(pit["type"], "FailedQueryResult");
}

#[tokio::test]
async fn timeline_respects_the_cutoff() {
    let app = app();
    let uuid = create_assessment(&app).await;
    update(&app, &uuid, "one").await;
    let cutoff = latest(&app, &uuid).await["updatedAt"].clone();
    update(&app, &uuid, "two").await;

    let response = query(
        &app,
        json!({
            "type": "TimelineQuery",
            "assessmentUuid": uuid,
            "timeStamp": cutoff,
        }),
    )
    .await;
    assert_eq!(
        response["result"]["timeline"].as_array().unwrap().len(),
        2
    );
}

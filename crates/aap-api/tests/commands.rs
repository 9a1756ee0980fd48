mod common;

use serde_json::{json, Value};
use uuid::Uuid;

use common::{app, commands, create_assessment, latest, post, query, update_answers, user};

#[tokio::test]
async fn create_returns_uuid_in_message() {
    let app = app();
    let (_, body) = post(
        &app,
        "/command",
        json!({
            "commands": [{
                "type": "CreateAssessmentCommand",
                "formVersion": "1.0",
                "user": user(),
            }]
        }),
    )
    .await;

    let entry = &body["commands"][0];
    let result = &entry["result"];
    assert_eq!(result["type"], "CreateAssessmentCommandResult");
    assert_eq!(result["success"], true);
    let uuid = result["assessmentUuid"].as_str().unwrap();
    assert!(Uuid::parse_str(uuid).is_ok());
    assert!(result["message"].as_str().unwrap().contains(uuid));

    // The decoded request is echoed back with defaults filled in.
    assert_eq!(entry["request"]["type"], "CreateAssessmentCommand");
    assert_eq!(entry["request"]["properties"], json!({}));
}

#[tokio::test]
async fn invalid_commands_fail_without_aborting_the_batch() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let results = commands(
        &app,
        vec![
            json!({ "type": "CreateAssessmentCommand", "user": user() }),
            json!({ "type": "TeleportAssessmentCommand", "user": user() }),
            json!({ "no": "type" }),
            update_answers(&uuid, "q1", "still applied"),
        ],
    )
    .await;

    assert_eq!(results[0]["type"], "CreateAssessmentCommandResult");
    assert_eq!(results[0]["success"], false);
    assert!(results[0]["message"].as_str().unwrap().contains("formVersion"));
    assert_eq!(results[1]["type"], "UnknownCommandResult");
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[2]["type"], "UnknownCommandResult");
    assert_eq!(results[3]["success"], true);

    assert_eq!(latest(&app, &uuid).await["answers"]["q1"], json!(["still applied"]));
}

#[tokio::test]
async fn undecodable_requests_are_echoed_verbatim() {
    let app = app();
    let raw = json!({ "type": "TeleportAssessmentCommand", "extra": 1 });
    let (_, body) = post(&app, "/command", json!({ "commands": [raw.clone()] })).await;
    assert_eq!(body["commands"][0]["request"], raw);
}

#[tokio::test]
async fn updating_an_unknown_assessment_fails() {
    let app = app();
    let missing = Uuid::new_v4().to_string();
    let results = commands(&app, vec![update_answers(&missing, "q1", "a")]).await;

    assert_eq!(results[0]["type"], "UpdateAssessmentAnswersCommandResult");
    assert_eq!(results[0]["success"], false);
    assert!(results[0]["message"].as_str().unwrap().contains(&missing));
}

#[tokio::test]
async fn every_update_changes_the_aggregate_uuid() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let mut seen = vec![latest(&app, &uuid).await["aggregateUuid"].clone()];
    for i in 0..5 {
        let results = commands(&app, vec![update_answers(&uuid, "q1", &format!("v{i}"))]).await;
        assert_eq!(results[0]["success"], true);
        let aggregate = latest(&app, &uuid).await["aggregateUuid"].clone();
        assert!(!seen.contains(&aggregate));
        seen.push(aggregate);
    }

    // Same content as before still yields a new version.
    commands(&app, vec![update_answers(&uuid, "q1", "v4")]).await;
    let aggregate = latest(&app, &uuid).await["aggregateUuid"].clone();
    assert!(!seen.contains(&aggregate));
}

#[tokio::test]
async fn answers_merge_and_remove() {
    let app = app();
    let uuid = create_assessment(&app).await;

    commands(
        &app,
        vec![
            update_answers(&uuid, "q1", "first"),
            update_answers(&uuid, "q2", "kept"),
            update_answers(&uuid, "q1", "second"),
            json!({
                "type": "UpdateAssessmentAnswersCommand",
                "assessmentUuid": uuid,
                "added": {},
                "removed": ["q2"],
                "user": user(),
            }),
        ],
    )
    .await;

    let state = latest(&app, &uuid).await;
    assert_eq!(state["answers"], json!({ "q1": ["second"] }));
}

#[tokio::test]
async fn properties_update_independently_of_answers() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let results = commands(
        &app,
        vec![json!({
            "type": "UpdateAssessmentPropertiesCommand",
            "assessmentUuid": uuid,
            "added": { "STATUS": ["COMPLETE"] },
            "removed": [],
            "user": user(),
        })],
    )
    .await;
    assert_eq!(results[0]["success"], true);

    let state = latest(&app, &uuid).await;
    assert_eq!(state["properties"]["STATUS"], json!(["COMPLETE"]));
    assert_eq!(state["answers"], json!({}));
}

async fn create_collection(app: &axum::Router, uuid: &str, name: &str) -> Value {
    commands(
        app,
        vec![json!({
            "type": "CreateCollectionCommand",
            "assessmentUuid": uuid,
            "name": name,
            "user": user(),
        })],
    )
    .await
    .remove(0)
}

#[tokio::test]
async fn collections_are_created_once_per_name() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let first = create_collection(&app, &uuid, "GOALS").await;
    assert_eq!(first["success"], true);
    let collection_uuid = first["collectionUuid"].clone();
    assert!(collection_uuid.is_string());
    let version = latest(&app, &uuid).await["aggregateUuid"].clone();

    let second = create_collection(&app, &uuid, "GOALS").await;
    assert_eq!(second["success"], true);
    assert_eq!(second["collectionUuid"], collection_uuid);
    // Nothing was appended.
    assert_eq!(latest(&app, &uuid).await["aggregateUuid"], version);
}

#[tokio::test]
async fn collection_items_lifecycle() {
    let app = app();
    let uuid = create_assessment(&app).await;
    let collection = create_collection(&app, &uuid, "GOALS").await;
    let collection_uuid = collection["collectionUuid"].as_str().unwrap().to_string();

    let added = commands(
        &app,
        vec![json!({
            "type": "AddCollectionItemCommand",
            "collectionUuid": collection_uuid,
            "assessmentUuid": uuid,
            "properties": { "STATUS": ["ACTIVE"] },
            "answers": { "title": ["Find housing"] },
            "user": user(),
        })],
    )
    .await
    .remove(0);
    assert_eq!(added["success"], true);
    assert_eq!(added["collectionUuid"], collection_uuid.as_str());
    let item_uuid = added["collectionItemUuid"].as_str().unwrap().to_string();

    let results = commands(
        &app,
        vec![
            json!({
                "type": "UpdateCollectionItemAnswersCommand",
                "assessmentUuid": uuid,
                "collectionItemUuid": item_uuid,
                "added": { "title": ["Find stable housing"] },
                "removed": [],
                "user": user(),
            }),
            json!({
                "type": "UpdateCollectionItemPropertiesCommand",
                "assessmentUuid": uuid,
                "collectionItemUuid": item_uuid,
                "added": { "STATUS": ["ACHIEVED"] },
                "removed": [],
                "user": user(),
            }),
        ],
    )
    .await;
    assert!(results.iter().all(|r| r["success"] == true));

    let state = latest(&app, &uuid).await;
    let item = &state["collections"][0]["items"][0];
    assert_eq!(item["uuid"], item_uuid.as_str());
    assert_eq!(item["answers"]["title"], json!(["Find stable housing"]));
    assert_eq!(item["properties"]["STATUS"], json!(["ACHIEVED"]));

    let removed = commands(
        &app,
        vec![json!({
            "type": "RemoveCollectionItemCommand",
            "assessmentUuid": uuid,
            "collectionItemUuid": item_uuid,
            "user": user(),
        })],
    )
    .await
    .remove(0);
    assert_eq!(removed["success"], true);
    assert_eq!(
        latest(&app, &uuid).await["collections"][0]["items"],
        json!([])
    );
}

#[tokio::test]
async fn adding_to_an_unknown_collection_leaves_answers_alone() {
    let app = app();
    let uuid = create_assessment(&app).await;
    commands(&app, vec![update_answers(&uuid, "q1", "before")]).await;
    let before = latest(&app, &uuid).await;

    let result = commands(
        &app,
        vec![json!({
            "type": "AddCollectionItemCommand",
            "collectionUuid": Uuid::new_v4(),
            "assessmentUuid": uuid,
            "properties": {},
            "answers": { "q1": ["after"] },
            "user": user(),
        })],
    )
    .await
    .remove(0);
    assert_eq!(result["type"], "AddCollectionItemCommandResult");
    assert_eq!(result["success"], false);

    let after = latest(&app, &uuid).await;
    assert_eq!(after["answers"], before["answers"]);
    assert_eq!(after["aggregateUuid"], before["aggregateUuid"]);
}

#[tokio::test]
async fn collection_owned_by_another_assessment_is_unknown() {
    let app = app();
    let first = create_assessment(&app).await;
    let second = create_assessment(&app).await;
    let collection = create_collection(&app, &first, "GOALS").await;

    let result = commands(
        &app,
        vec![json!({
            "type": "AddCollectionItemCommand",
            "collectionUuid": collection["collectionUuid"],
            "assessmentUuid": second,
            "user": user(),
        })],
    )
    .await
    .remove(0);
    assert_eq!(result["success"], false);
}

#[tokio::test]
async fn later_commands_see_earlier_ones_in_the_same_batch() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let results = commands(
        &app,
        vec![
            json!({
                "type": "CreateCollectionCommand",
                "assessmentUuid": uuid,
                "name": "GOALS",
                "user": user(),
            }),
            json!({
                "type": "CreateCollectionCommand",
                "assessmentUuid": uuid,
                "name": "GOALS",
                "user": user(),
            }),
        ],
    )
    .await;

    assert_eq!(results[0]["collectionUuid"], results[1]["collectionUuid"]);
    let state = latest(&app, &uuid).await;
    assert_eq!(state["collections"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn external_identifiers_are_unique() {
    let app = app();
    let create = |crn: &str| {
        json!({
            "type": "CreateAssessmentCommand",
            "formVersion": "1.0",
            "identifiers": { "CRN": crn },
            "user": user(),
        })
    };

    let results = commands(&app, vec![create("X123456"), create("X123456")]).await;
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["message"].as_str().unwrap().contains("X123456"));

    let results = commands(&app, vec![create("bad value!")]).await;
    assert_eq!(results[0]["success"], false);
}

#[tokio::test]
async fn failed_create_leaves_its_other_identifiers_free() {
    let app = app();
    let create = |identifiers: Value| {
        json!({
            "type": "CreateAssessmentCommand",
            "formVersion": "1.0",
            "identifiers": identifiers,
            "user": user(),
        })
    };

    let results = commands(&app, vec![create(json!({ "CRN": "X1" }))]).await;
    assert_eq!(results[0]["success"], true, "{}", results[0]);

    // ALT sorts before CRN, so a claim-as-you-go create would bind A9 first.
    let results = commands(&app, vec![create(json!({ "ALT": "A9", "CRN": "X1" }))]).await;
    assert_eq!(results[0]["success"], false);
    assert!(
        results[0]["message"]
            .as_str()
            .unwrap()
            .contains("CRN=X1 is already bound to another assessment"),
        "{}",
        results[0]
    );

    let found = query(
        &app,
        json!({
            "type": "AssessmentVersionQuery",
            "user": user(),
            "assessmentIdentifier": { "type": "EXTERNAL", "identifierType": "ALT", "identifier": "A9" },
        }),
    )
    .await;
    assert_eq!(found["result"]["type"], "FailedQueryResult");
    assert_eq!(
        found["result"]["message"],
        "No assessment registered for ALT=A9"
    );

    let results = commands(&app, vec![create(json!({ "ALT": "A9" }))]).await;
    assert_eq!(results[0]["success"], true, "{}", results[0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batches_on_one_assessment_lose_nothing() {
    let app = app();
    let uuid = create_assessment(&app).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let app = app.clone();
        let uuid = uuid.clone();
        handles.push(tokio::spawn(async move {
            commands(&app, vec![update_answers(&uuid, &format!("q{i}"), "x")]).await
        }));
    }
    for handle in handles {
        let results = handle.await.unwrap();
        assert_eq!(results[0]["success"], true, "{}", results[0]);
    }

    let state = latest(&app, &uuid).await;
    assert_eq!(state["answers"].as_object().unwrap().len(), 20);
}

use aap_audit::events::AuditEvent;
use aap_core::models::event::{DomainEvent, StoredEvent, ValuesChanged};
use aap_core::models::timeline::TimelineMarker;
use aap_core::models::user::User;
use aap_core::time::ServerTimestamp;
use serde_json::json;
use uuid::Uuid;

fn stored_with(timeline: Option<TimelineMarker>) -> StoredEvent {
    let event = DomainEvent::AnswersUpdated(ValuesChanged {
        added: [("q1".to_string(), vec!["yes".to_string()])].into(),
        removed: Vec::new(),
    });
    StoredEvent::new(
        Uuid::new_v4(),
        3,
        "UpdateAssessmentAnswersCommand",
        &event,
        &User::new("practitioner-1", "A Practitioner"),
        timeline,
        ServerTimestamp::now(),
    )
    .unwrap()
}

fn stored() -> StoredEvent {
    stored_with(None)
}

#[test]
fn applied_copies_event_identity() {
    let event = stored();
    let audit = AuditEvent::applied(&event, "aap-ui");

    assert_eq!(audit.command_type, "UpdateAssessmentAnswersCommand");
    assert_eq!(audit.event_type, "AssessmentAnswersUpdatedEvent");
    assert_eq!(audit.assessment_uuid, event.assessment_uuid);
    assert_eq!(audit.event_uuid, event.event_uuid);
    assert_eq!(audit.sequence, 3);
    assert_eq!(audit.user_id, "practitioner-1");
    assert_eq!(audit.principal, "aap-ui");
}

#[test]
fn serializes_camel_case_without_an_empty_timeline() {
    let audit = AuditEvent::applied(&stored(), "aap-ui");
    let value = serde_json::to_value(&audit).unwrap();

    assert_eq!(value["commandType"], "UpdateAssessmentAnswersCommand");
    assert_eq!(value["userId"], "practitioner-1");
    assert!(value.get("timeline").is_none());
}

#[test]
fn applied_carries_the_timeline_marker() {
    let marker = TimelineMarker {
        custom_type: "GOAL_ACHIEVED".to_string(),
        data: Some(json!({ "goal": "housing" })),
    };
    let audit = AuditEvent::applied(&stored_with(Some(marker.clone())), "aap-ui");
    assert_eq!(audit.timeline, Some(marker));

    let value = serde_json::to_value(&audit).unwrap();
    assert_eq!(value["timeline"]["type"], "GOAL_ACHIEVED");
    assert_eq!(value["timeline"]["data"]["goal"], "housing");

    audit.emit();
}

#[test]
fn emit_without_subscriber_is_harmless() {
    AuditEvent::applied(&stored(), "aap-ui").emit();
}

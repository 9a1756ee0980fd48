use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use aap_core::models::event::StoredEvent;
use aap_core::models::timeline::TimelineMarker;

/// One applied command, as recorded in the service logs.
///
/// `principal` is the authenticated caller (token subject or client id);
/// `user_id` is the end user the command was issued on behalf of. The two
/// differ whenever a frontend calls the API with its own credentials.
/// `timeline` is the marker the command carried, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub command_type: String,
    pub event_type: String,
    pub assessment_uuid: Uuid,
    pub event_uuid: Uuid,
    pub sequence: u64,
    pub user_id: String,
    pub principal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

impl AuditEvent {
    pub fn applied(event: &StoredEvent, principal: impl Into<String>) -> Self {
        Self {
            command_type: event.command_type.clone(),
            event_type: event.event_type.clone(),
            assessment_uuid: event.assessment_uuid,
            event_uuid: event.event_uuid,
            sequence: event.sequence,
            user_id: event.user.id.clone(),
            principal: principal.into(),
            timeline: event.timeline.clone(),
        }
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        info!(
            audit.command_type = %self.command_type,
            audit.event_type = %self.event_type,
            audit.assessment_uuid = %self.assessment_uuid,
            audit.event_uuid = %self.event_uuid,
            audit.sequence = self.sequence,
            audit.user_id = %self.user_id,
            audit.principal = %self.principal,
            audit.timeline_type = self.timeline.as_ref().map(|t| t.custom_type.as_str()),
            "audit event"
        );
    }
}

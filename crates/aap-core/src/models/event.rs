use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::assessment::ValueMap;
use super::timeline::TimelineMarker;
use super::user::User;
use crate::error::CoreError;
use crate::time::ServerTimestamp;

/// Event type names as persisted in the log.
pub mod event_type {
    pub const ASSESSMENT_CREATED: &str = "AssessmentCreatedEvent";
    pub const ANSWERS_UPDATED: &str = "AssessmentAnswersUpdatedEvent";
    pub const PROPERTIES_UPDATED: &str = "AssessmentPropertiesUpdatedEvent";
    pub const COLLECTION_CREATED: &str = "CollectionCreatedEvent";
    pub const COLLECTION_ITEM_ADDED: &str = "CollectionItemAddedEvent";
    pub const COLLECTION_ITEM_ANSWERS_UPDATED: &str = "CollectionItemAnswersUpdatedEvent";
    pub const COLLECTION_ITEM_PROPERTIES_UPDATED: &str = "CollectionItemPropertiesUpdatedEvent";
    pub const COLLECTION_ITEM_REMOVED: &str = "CollectionItemRemovedEvent";
}

/// An immutable record in an assessment's event log.
///
/// `data` is kept as raw JSON so that a log written by a newer (or broken)
/// writer still loads; the projector decodes it per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub event_uuid: Uuid,
    pub assessment_uuid: Uuid,
    /// 1-based position in the assessment's log.
    pub sequence: u64,
    pub command_type: String,
    pub event_type: String,
    pub data: Value,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
    pub created_at: ServerTimestamp,
}

impl StoredEvent {
    pub fn new(
        assessment_uuid: Uuid,
        sequence: u64,
        command_type: &str,
        event: &DomainEvent,
        user: &User,
        timeline: Option<TimelineMarker>,
        created_at: ServerTimestamp,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            event_uuid: Uuid::new_v4(),
            assessment_uuid,
            sequence,
            command_type: command_type.to_string(),
            event_type: event.event_type().to_string(),
            data: event.to_data()?,
            user: user.clone(),
            timeline,
            created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCreated {
    pub form_version: String,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub properties: ValueMap,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesChanged {
    #[serde(default)]
    pub added: ValueMap,
    #[serde(default)]
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCreated {
    pub collection_uuid: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItemAdded {
    pub collection_uuid: Uuid,
    pub collection_item_uuid: Uuid,
    #[serde(default)]
    pub properties: ValueMap,
    #[serde(default)]
    pub answers: ValueMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItemChanged {
    pub collection_item_uuid: Uuid,
    #[serde(default)]
    pub added: ValueMap,
    #[serde(default)]
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItemRemoved {
    pub collection_item_uuid: Uuid,
}

/// The typed payload of a stored event.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    AssessmentCreated(AssessmentCreated),
    AnswersUpdated(ValuesChanged),
    PropertiesUpdated(ValuesChanged),
    CollectionCreated(CollectionCreated),
    CollectionItemAdded(CollectionItemAdded),
    CollectionItemAnswersUpdated(CollectionItemChanged),
    CollectionItemPropertiesUpdated(CollectionItemChanged),
    CollectionItemRemoved(CollectionItemRemoved),
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::AssessmentCreated(_) => event_type::ASSESSMENT_CREATED,
            DomainEvent::AnswersUpdated(_) => event_type::ANSWERS_UPDATED,
            DomainEvent::PropertiesUpdated(_) => event_type::PROPERTIES_UPDATED,
            DomainEvent::CollectionCreated(_) => event_type::COLLECTION_CREATED,
            DomainEvent::CollectionItemAdded(_) => event_type::COLLECTION_ITEM_ADDED,
            DomainEvent::CollectionItemAnswersUpdated(_) => {
                event_type::COLLECTION_ITEM_ANSWERS_UPDATED
            }
            DomainEvent::CollectionItemPropertiesUpdated(_) => {
                event_type::COLLECTION_ITEM_PROPERTIES_UPDATED
            }
            DomainEvent::CollectionItemRemoved(_) => event_type::COLLECTION_ITEM_REMOVED,
        }
    }

    pub fn to_data(&self) -> Result<Value, serde_json::Error> {
        match self {
            DomainEvent::AssessmentCreated(e) => serde_json::to_value(e),
            DomainEvent::AnswersUpdated(e) | DomainEvent::PropertiesUpdated(e) => {
                serde_json::to_value(e)
            }
            DomainEvent::CollectionCreated(e) => serde_json::to_value(e),
            DomainEvent::CollectionItemAdded(e) => serde_json::to_value(e),
            DomainEvent::CollectionItemAnswersUpdated(e)
            | DomainEvent::CollectionItemPropertiesUpdated(e) => serde_json::to_value(e),
            DomainEvent::CollectionItemRemoved(e) => serde_json::to_value(e),
        }
    }

    /// Decode a stored payload. Returns `Ok(None)` for event types this build
    /// does not know about.
    pub fn decode(event_type: &str, data: &Value) -> Result<Option<Self>, serde_json::Error> {
        let event = match event_type {
            event_type::ASSESSMENT_CREATED => {
                DomainEvent::AssessmentCreated(AssessmentCreated::deserialize(data)?)
            }
            event_type::ANSWERS_UPDATED => {
                DomainEvent::AnswersUpdated(ValuesChanged::deserialize(data)?)
            }
            event_type::PROPERTIES_UPDATED => {
                DomainEvent::PropertiesUpdated(ValuesChanged::deserialize(data)?)
            }
            event_type::COLLECTION_CREATED => {
                DomainEvent::CollectionCreated(CollectionCreated::deserialize(data)?)
            }
            event_type::COLLECTION_ITEM_ADDED => {
                DomainEvent::CollectionItemAdded(CollectionItemAdded::deserialize(data)?)
            }
            event_type::COLLECTION_ITEM_ANSWERS_UPDATED => {
                DomainEvent::CollectionItemAnswersUpdated(CollectionItemChanged::deserialize(data)?)
            }
            event_type::COLLECTION_ITEM_PROPERTIES_UPDATED => {
                DomainEvent::CollectionItemPropertiesUpdated(CollectionItemChanged::deserialize(
                    data,
                )?)
            }
            event_type::COLLECTION_ITEM_REMOVED => {
                DomainEvent::CollectionItemRemoved(CollectionItemRemoved::deserialize(data)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use super::assessment::ValueMap;
use super::identifier::validate_identifier;
use super::timeline::TimelineMarker;
use super::user::User;
use crate::error::CoreError;

/// Command type tags accepted on `POST /command`.
pub mod command_type {
    pub const CREATE_ASSESSMENT: &str = "CreateAssessmentCommand";
    pub const UPDATE_ANSWERS: &str = "UpdateAssessmentAnswersCommand";
    pub const UPDATE_PROPERTIES: &str = "UpdateAssessmentPropertiesCommand";
    pub const CREATE_COLLECTION: &str = "CreateCollectionCommand";
    pub const ADD_COLLECTION_ITEM: &str = "AddCollectionItemCommand";
    pub const UPDATE_COLLECTION_ITEM_ANSWERS: &str = "UpdateCollectionItemAnswersCommand";
    pub const UPDATE_COLLECTION_ITEM_PROPERTIES: &str = "UpdateCollectionItemPropertiesCommand";
    pub const REMOVE_COLLECTION_ITEM: &str = "RemoveCollectionItemCommand";

    pub const ALL: &[&str] = &[
        CREATE_ASSESSMENT,
        UPDATE_ANSWERS,
        UPDATE_PROPERTIES,
        CREATE_COLLECTION,
        ADD_COLLECTION_ITEM,
        UPDATE_COLLECTION_ITEM_ANSWERS,
        UPDATE_COLLECTION_ITEM_PROPERTIES,
        REMOVE_COLLECTION_ITEM,
    ];
}

/// Result type reported for request items whose `type` is missing or unknown.
pub const UNKNOWN_COMMAND_RESULT: &str = "UnknownCommandResult";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "CreateAssessmentCommand")]
    CreateAssessment(CreateAssessment),
    #[serde(rename = "UpdateAssessmentAnswersCommand")]
    UpdateAnswers(UpdateValues),
    #[serde(rename = "UpdateAssessmentPropertiesCommand")]
    UpdateProperties(UpdateValues),
    #[serde(rename = "CreateCollectionCommand")]
    CreateCollection(CreateCollection),
    #[serde(rename = "AddCollectionItemCommand")]
    AddCollectionItem(AddCollectionItem),
    #[serde(rename = "UpdateCollectionItemAnswersCommand")]
    UpdateCollectionItemAnswers(UpdateCollectionItem),
    #[serde(rename = "UpdateCollectionItemPropertiesCommand")]
    UpdateCollectionItemProperties(UpdateCollectionItem),
    #[serde(rename = "RemoveCollectionItemCommand")]
    RemoveCollectionItem(RemoveCollectionItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessment {
    pub form_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub properties: ValueMap,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

/// Body of the answers and properties update commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValues {
    pub assessment_uuid: Uuid,
    #[serde(default)]
    pub added: ValueMap,
    #[serde(default)]
    pub removed: Vec<String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollection {
    pub assessment_uuid: Uuid,
    pub name: String,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCollectionItem {
    pub collection_uuid: Uuid,
    pub assessment_uuid: Uuid,
    #[serde(default)]
    pub properties: ValueMap,
    #[serde(default)]
    pub answers: ValueMap,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionItem {
    pub assessment_uuid: Uuid,
    pub collection_item_uuid: Uuid,
    #[serde(default)]
    pub added: ValueMap,
    #[serde(default)]
    pub removed: Vec<String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCollectionItem {
    pub assessment_uuid: Uuid,
    pub collection_item_uuid: Uuid,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineMarker>,
}

impl Command {
    /// Decode and validate one raw request item.
    pub fn decode(raw: &Value) -> Result<Self, CoreError> {
        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::MissingField("type".to_string()))?;
        if !command_type::ALL.contains(&tag) {
            return Err(CoreError::UnknownType(tag.to_string()));
        }

        let command = Command::deserialize(raw).map_err(|e| CoreError::InvalidRequest {
            request_type: tag.to_string(),
            reason: e.to_string(),
        })?;
        command.validate()?;
        Ok(command)
    }

    fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidRequest {
            request_type: self.command_type().to_string(),
            reason: reason.to_string(),
        };

        if self.user().id.trim().is_empty() {
            return Err(invalid("user.id must not be empty"));
        }
        match self {
            Command::CreateAssessment(c) => {
                if c.form_version.trim().is_empty() {
                    return Err(invalid("formVersion must not be empty"));
                }
                for (identifier_type, identifier) in &c.identifiers {
                    validate_identifier(identifier_type, identifier)?;
                }
            }
            Command::CreateCollection(c) if c.name.trim().is_empty() => {
                return Err(invalid("name must not be empty"));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn command_type(&self) -> &'static str {
        match self {
            Command::CreateAssessment(_) => command_type::CREATE_ASSESSMENT,
            Command::UpdateAnswers(_) => command_type::UPDATE_ANSWERS,
            Command::UpdateProperties(_) => command_type::UPDATE_PROPERTIES,
            Command::CreateCollection(_) => command_type::CREATE_COLLECTION,
            Command::AddCollectionItem(_) => command_type::ADD_COLLECTION_ITEM,
            Command::UpdateCollectionItemAnswers(_) => command_type::UPDATE_COLLECTION_ITEM_ANSWERS,
            Command::UpdateCollectionItemProperties(_) => {
                command_type::UPDATE_COLLECTION_ITEM_PROPERTIES
            }
            Command::RemoveCollectionItem(_) => command_type::REMOVE_COLLECTION_ITEM,
        }
    }

    pub fn result_type(&self) -> String {
        format!("{}Result", self.command_type())
    }

    /// The existing assessment this command mutates. `None` for creation.
    pub fn assessment_uuid(&self) -> Option<Uuid> {
        match self {
            Command::CreateAssessment(_) => None,
            Command::UpdateAnswers(c) | Command::UpdateProperties(c) => Some(c.assessment_uuid),
            Command::CreateCollection(c) => Some(c.assessment_uuid),
            Command::AddCollectionItem(c) => Some(c.assessment_uuid),
            Command::UpdateCollectionItemAnswers(c) | Command::UpdateCollectionItemProperties(c) => {
                Some(c.assessment_uuid)
            }
            Command::RemoveCollectionItem(c) => Some(c.assessment_uuid),
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Command::CreateAssessment(c) => &c.user,
            Command::UpdateAnswers(c) | Command::UpdateProperties(c) => &c.user,
            Command::CreateCollection(c) => &c.user,
            Command::AddCollectionItem(c) => &c.user,
            Command::UpdateCollectionItemAnswers(c) | Command::UpdateCollectionItemProperties(c) => {
                &c.user
            }
            Command::RemoveCollectionItem(c) => &c.user,
        }
    }

    pub fn timeline(&self) -> Option<&TimelineMarker> {
        match self {
            Command::CreateAssessment(c) => c.timeline.as_ref(),
            Command::UpdateAnswers(c) | Command::UpdateProperties(c) => c.timeline.as_ref(),
            Command::CreateCollection(c) => c.timeline.as_ref(),
            Command::AddCollectionItem(c) => c.timeline.as_ref(),
            Command::UpdateCollectionItemAnswers(c) | Command::UpdateCollectionItemProperties(c) => {
                c.timeline.as_ref()
            }
            Command::RemoveCollectionItem(c) => c.timeline.as_ref(),
        }
    }
}

/// The result `type` to report for a raw request item, decodable or not.
pub fn result_type_for(raw: &Value) -> String {
    match raw.get("type").and_then(Value::as_str) {
        Some(tag) if command_type::ALL.contains(&tag) => format!("{tag}Result"),
        _ => UNKNOWN_COMMAND_RESULT.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommandResult {
    #[serde(rename = "type")]
    pub result_type: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_item_uuid: Option<Uuid>,
}

impl CommandResult {
    pub fn succeeded(result_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result_type: result_type.into(),
            success: true,
            message: message.into(),
            assessment_uuid: None,
            collection_uuid: None,
            collection_item_uuid: None,
        }
    }

    pub fn failed(result_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::succeeded(result_type, message)
        }
    }

    pub fn with_assessment(mut self, uuid: Uuid) -> Self {
        self.assessment_uuid = Some(uuid);
        self
    }

    pub fn with_collection(mut self, uuid: Uuid) -> Self {
        self.collection_uuid = Some(uuid);
        self
    }

    pub fn with_collection_item(mut self, uuid: Uuid) -> Self {
        self.collection_item_uuid = Some(uuid);
        self
    }
}

/// `POST /command` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandBatch {
    pub commands: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub request: Value,
    pub result: CommandResult,
}

/// `POST /command` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandBatchResponse {
    pub commands: Vec<CommandResponse>,
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::user::User;
use crate::time::ServerTimestamp;

/// A client-supplied tag attached to a mutating command, e.g.
/// `{"type": "GOAL_ACHIEVED", "data": {"goalUuid": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMarker {
    #[serde(rename = "type")]
    pub custom_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// One applied event as seen by `TimelineQuery`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TimelineEntry {
    pub event_uuid: Uuid,
    pub sequence: u64,
    #[ts(type = "string")]
    pub timestamp: ServerTimestamp,
    pub user: User,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
}

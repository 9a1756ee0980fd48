use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::assessment::{AssessmentVersion, Collection};
use super::identifier::{resolve_target, AssessmentIdentifier};
use super::timeline::TimelineEntry;
use super::user::User;
use crate::error::CoreError;
use crate::time::ServerTimestamp;

/// Query type tags accepted on `POST /query`.
pub mod query_type {
    pub const ASSESSMENT_VERSION: &str = "AssessmentVersionQuery";
    pub const TIMELINE: &str = "TimelineQuery";
    pub const COLLECTION: &str = "CollectionQuery";

    pub const ALL: &[&str] = &[ASSESSMENT_VERSION, TIMELINE, COLLECTION];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    #[serde(rename = "AssessmentVersionQuery")]
    AssessmentVersion(AssessmentVersionQuery),
    #[serde(rename = "TimelineQuery")]
    Timeline(TimelineQuery),
    #[serde(rename = "CollectionQuery")]
    Collection(CollectionQuery),
}

/// Reconstruct an assessment as of `timestamp` (latest state when absent).
/// Requests may spell it `timeStamp`; the echo always carries `timestamp`,
/// `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentVersionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_identifier: Option<AssessmentIdentifier>,
    #[serde(default, rename = "timestamp", alias = "timeStamp")]
    pub time_stamp: Option<ServerTimestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_identifier: Option<AssessmentIdentifier>,
    /// Custom timeline types to keep. Empty keeps every entry.
    #[serde(default)]
    pub include_custom_types: Vec<String>,
    #[serde(default, rename = "timestamp", alias = "timeStamp")]
    pub time_stamp: Option<ServerTimestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_identifier: Option<AssessmentIdentifier>,
    pub collection_name: String,
    #[serde(default, rename = "timestamp", alias = "timeStamp")]
    pub time_stamp: Option<ServerTimestamp>,
}

impl Query {
    /// Decode one raw request item.
    pub fn decode(raw: &Value) -> Result<Self, CoreError> {
        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::MissingField("type".to_string()))?;
        if !query_type::ALL.contains(&tag) {
            return Err(CoreError::UnknownType(tag.to_string()));
        }

        Query::deserialize(raw).map_err(|e| CoreError::InvalidRequest {
            request_type: tag.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn query_type(&self) -> &'static str {
        match self {
            Query::AssessmentVersion(_) => query_type::ASSESSMENT_VERSION,
            Query::Timeline(_) => query_type::TIMELINE,
            Query::Collection(_) => query_type::COLLECTION,
        }
    }

    pub fn cutoff(&self) -> Option<ServerTimestamp> {
        match self {
            Query::AssessmentVersion(q) => q.time_stamp,
            Query::Timeline(q) => q.time_stamp,
            Query::Collection(q) => q.time_stamp,
        }
    }

    /// Resolve the target assessment and rewrite the request so it names it
    /// through `assessmentIdentifier` only, which is the form echoed back.
    pub fn normalize(&mut self) -> Result<AssessmentIdentifier, CoreError> {
        let request_type = self.query_type();
        let (uuid, identifier) = match self {
            Query::AssessmentVersion(q) => (&mut q.assessment_uuid, &mut q.assessment_identifier),
            Query::Timeline(q) => (&mut q.assessment_uuid, &mut q.assessment_identifier),
            Query::Collection(q) => (&mut q.assessment_uuid, &mut q.assessment_identifier),
        };

        let target = resolve_target(request_type, *uuid, identifier.as_ref())?;
        *uuid = None;
        *identifier = Some(target.clone());
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueryResult {
    #[serde(rename = "AssessmentVersionQueryResult")]
    AssessmentVersion(AssessmentVersion),
    #[serde(rename = "TimelineQueryResult")]
    Timeline(TimelineResult),
    #[serde(rename = "CollectionQueryResult")]
    Collection(CollectionResult),
    #[serde(rename = "FailedQueryResult")]
    Failed(FailedQuery),
}

impl QueryResult {
    pub fn failed(query_type: impl Into<String>, message: impl Into<String>) -> Self {
        QueryResult::Failed(FailedQuery {
            query_type: query_type.into(),
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResult {
    pub assessment_uuid: Uuid,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResult {
    pub assessment_uuid: Uuid,
    pub aggregate_uuid: Uuid,
    pub collection: Collection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedQuery {
    /// The query type that failed, or the raw tag when it was not recognised.
    pub query_type: String,
    pub message: String,
}

/// `POST /query` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBatch {
    pub queries: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub request: Value,
    pub result: QueryResult,
}

/// `POST /query` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBatchResponse {
    pub queries: Vec<QueryResponse>,
}

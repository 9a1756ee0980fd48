use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown request type: {0}")]
    UnknownType(String),

    #[error("invalid {request_type}: {reason}")]
    InvalidRequest {
        request_type: String,
        reason: String,
    },

    #[error("invalid identifier {identifier_type}={identifier}")]
    InvalidIdentifier {
        identifier_type: String,
        identifier: String,
    },

    #[error("Assessment not found: {0}")]
    AssessmentNotFound(Uuid),

    #[error("No assessment registered for {identifier_type}={identifier}")]
    IdentifierNotFound {
        identifier_type: String,
        identifier: String,
    },

    #[error("Collection {collection_uuid} not found on assessment {assessment_uuid}")]
    CollectionNotFound {
        collection_uuid: Uuid,
        assessment_uuid: Uuid,
    },

    #[error("Collection '{name}' not found on assessment {assessment_uuid}")]
    CollectionNameNotFound { name: String, assessment_uuid: Uuid },

    #[error("Collection item {item_uuid} not found on assessment {assessment_uuid}")]
    CollectionItemNotFound {
        item_uuid: Uuid,
        assessment_uuid: Uuid,
    },
}

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("assessment not found: {0}")]
    AssessmentNotFound(Uuid),

    #[error("assessment already exists: {0}")]
    AssessmentExists(Uuid),

    #[error(
        "concurrent modification of assessment {assessment_uuid} \
         (expected last sequence {expected}, found {actual})"
    )]
    SequenceConflict {
        assessment_uuid: Uuid,
        expected: u64,
        actual: u64,
    },

    #[error("identifier {identifier_type}={identifier} is already bound to another assessment")]
    IdentifierTaken {
        identifier_type: String,
        identifier: String,
    },

    #[error("precondition failed for key: {key}")]
    PreconditionFailed { key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("S3 GetObject error: {0}")]
    GetObject(String),

    #[error("S3 PutObject error: {0}")]
    PutObject(String),

    #[error("S3 DeleteObject error: {0}")]
    DeleteObject(String),
}

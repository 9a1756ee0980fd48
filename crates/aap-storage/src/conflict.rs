//! Write rules shared by every store backend.

use uuid::Uuid;

use aap_core::models::event::StoredEvent;

use crate::error::StorageError;

/// An append is admitted only when `event` directly follows the last event
/// in `log`.
pub fn check_next_sequence(log: &[StoredEvent], event: &StoredEvent) -> Result<(), StorageError> {
    let actual = log.last().map(|e| e.sequence).unwrap_or(0);
    let expected = event.sequence.saturating_sub(1);
    if actual != expected {
        return Err(StorageError::SequenceConflict {
            assessment_uuid: event.assessment_uuid,
            expected,
            actual,
        });
    }
    Ok(())
}

/// A create-only write that hit an existing object means the assessment
/// already has a log.
pub fn create_error(err: StorageError, assessment_uuid: Uuid) -> StorageError {
    match err {
        StorageError::PreconditionFailed { .. } => StorageError::AssessmentExists(assessment_uuid),
        other => other,
    }
}

/// Outcome of claiming an identifier whose current owner is `owner`.
pub fn claim_outcome(
    owner: Option<Uuid>,
    identifier_type: &str,
    identifier: &str,
    assessment_uuid: Uuid,
) -> Result<(), StorageError> {
    match owner {
        Some(owner) if owner != assessment_uuid => Err(StorageError::IdentifierTaken {
            identifier_type: identifier_type.to_string(),
            identifier: identifier.to_string(),
        }),
        _ => Ok(()),
    }
}

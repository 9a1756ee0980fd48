//! Object key conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of objects in the AAP event bucket.

use uuid::Uuid;

/// The append-only event log of one assessment.
pub fn event_log(assessment_uuid: Uuid) -> String {
    format!("assessments/{assessment_uuid}/events.json")
}

/// Claim record binding an external identifier to an assessment.
///
/// Callers validate both parts with
/// [`validate_identifier`](crate::models::identifier::validate_identifier)
/// before building a key.
pub fn identifier(identifier_type: &str, identifier: &str) -> String {
    format!("identifiers/{identifier_type}/{identifier}.json")
}

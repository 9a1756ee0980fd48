use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// How a query names its assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssessmentIdentifier {
    #[serde(rename = "UUID")]
    Uuid { uuid: Uuid },

    /// An external identifier registered at creation, e.g. `CRN` → `X123456`.
    #[serde(rename = "EXTERNAL", rename_all = "camelCase")]
    External {
        identifier_type: String,
        identifier: String,
    },
}

/// Resolve the two ways a request can name an assessment into one identifier.
///
/// `assessmentIdentifier` wins when both are present.
pub fn resolve_target(
    request_type: &str,
    assessment_uuid: Option<Uuid>,
    assessment_identifier: Option<&AssessmentIdentifier>,
) -> Result<AssessmentIdentifier, CoreError> {
    match (assessment_identifier, assessment_uuid) {
        (Some(identifier), _) => Ok(identifier.clone()),
        (None, Some(uuid)) => Ok(AssessmentIdentifier::Uuid { uuid }),
        (None, None) => Err(CoreError::InvalidRequest {
            request_type: request_type.to_string(),
            reason: "one of assessmentUuid or assessmentIdentifier is required".to_string(),
        }),
    }
}

/// External identifier types and values become store keys, so they are
/// restricted to `[A-Za-z0-9_.-]`.
pub fn validate_identifier(identifier_type: &str, identifier: &str) -> Result<(), CoreError> {
    let ok = |s: &str| {
        !s.is_empty()
            && s.len() <= 128
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    };
    if ok(identifier_type) && ok(identifier) {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier {
            identifier_type: identifier_type.to_string(),
            identifier: identifier.to_string(),
        })
    }
}

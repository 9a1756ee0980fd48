use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aap_core::models::event::StoredEvent;
use aap_core::store_keys;

use crate::conflict;
use crate::error::StorageError;
use crate::{objects, state};

const CLAIM_ATTEMPTS: usize = 3;

/// Event logs stored as one JSON object per assessment.
///
/// Every write is conditional: creation uses `If-None-Match: *` and appends
/// use `If-Match` on the ETag that was read, so two writers racing on one
/// assessment cannot both succeed.
#[derive(Debug, Clone)]
pub struct S3EventStore {
    client: Client,
    bucket: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EventLog {
    events: Vec<StoredEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifierClaim {
    assessment_uuid: Uuid,
}

impl S3EventStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn create(&self, event: &StoredEvent) -> Result<(), StorageError> {
        let key = store_keys::event_log(event.assessment_uuid);
        let log = EventLog {
            events: vec![event.clone()],
        };
        state::save_state_if_absent(&self.client, &self.bucket, &key, &log)
            .await
            .map_err(|e| conflict::create_error(e, event.assessment_uuid))?;
        Ok(())
    }

    pub async fn append(&self, event: &StoredEvent) -> Result<(), StorageError> {
        let key = store_keys::event_log(event.assessment_uuid);
        let (mut log, etag) = self.load_log(event.assessment_uuid).await?;

        conflict::check_next_sequence(&log.events, event)?;
        log.events.push(event.clone());
        state::save_state_if_match(&self.client, &self.bucket, &key, &log, &etag).await?;
        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            sequence = event.sequence,
            "event appended"
        );
        Ok(())
    }

    pub async fn load(&self, assessment_uuid: Uuid) -> Result<Vec<StoredEvent>, StorageError> {
        let (log, _) = self.load_log(assessment_uuid).await?;
        Ok(log.events)
    }

    async fn load_log(&self, assessment_uuid: Uuid) -> Result<(EventLog, String), StorageError> {
        let key = store_keys::event_log(assessment_uuid);
        match state::load_state::<EventLog>(&self.client, &self.bucket, &key).await {
            Err(StorageError::NotFound { .. }) => {
                Err(StorageError::AssessmentNotFound(assessment_uuid))
            }
            other => other,
        }
    }

    pub async fn claim_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        let key = store_keys::identifier(identifier_type, identifier);
        let claim = IdentifierClaim { assessment_uuid };
        // A claim released between our write and our read leaves no owner;
        // try the create-only write again.
        for _ in 0..CLAIM_ATTEMPTS {
            match state::save_state_if_absent(&self.client, &self.bucket, &key, &claim).await {
                Ok(_) => return Ok(()),
                Err(StorageError::PreconditionFailed { .. }) => {}
                Err(e) => return Err(e),
            }
            if let Some(owner) = self.find_identifier(identifier_type, identifier).await? {
                return conflict::claim_outcome(
                    Some(owner),
                    identifier_type,
                    identifier,
                    assessment_uuid,
                );
            }
        }
        Err(StorageError::IdentifierTaken {
            identifier_type: identifier_type.to_string(),
            identifier: identifier.to_string(),
        })
    }

    /// Delete a claim object, but only the version that still names
    /// `assessment_uuid`.
    pub async fn release_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        let key = store_keys::identifier(identifier_type, identifier);
        let (claim, etag) =
            match state::load_state::<IdentifierClaim>(&self.client, &self.bucket, &key).await {
                Ok(found) => found,
                Err(StorageError::NotFound { .. }) => return Ok(()),
                Err(e) => return Err(e),
            };
        if claim.assessment_uuid != assessment_uuid {
            return Ok(());
        }
        match objects::delete_object_if_match(&self.client, &self.bucket, &key, &etag).await {
            // Someone rewrote the claim after we read it; it is no longer ours.
            Ok(()) | Err(StorageError::PreconditionFailed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn find_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
    ) -> Result<Option<Uuid>, StorageError> {
        let key = store_keys::identifier(identifier_type, identifier);
        match state::load_state::<IdentifierClaim>(&self.client, &self.bucket, &key).await {
            Ok((claim, _)) => Ok(Some(claim.assessment_uuid)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

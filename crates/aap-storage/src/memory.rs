use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use aap_core::models::event::StoredEvent;

use crate::conflict;
use crate::error::StorageError;

/// Event logs held in process memory. Used for local runs and tests.
///
/// Appends check the expected sequence under the write lock, so the log
/// behaves like the S3 store under concurrent writers.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    logs: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
    identifiers: RwLock<HashMap<(String, String), Uuid>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, event: &StoredEvent) -> Result<(), StorageError> {
        let mut logs = self.logs.write().await;
        match logs.entry(event.assessment_uuid) {
            Entry::Occupied(_) => Err(StorageError::AssessmentExists(event.assessment_uuid)),
            Entry::Vacant(slot) => {
                slot.insert(vec![event.clone()]);
                Ok(())
            }
        }
    }

    pub async fn append(&self, event: &StoredEvent) -> Result<(), StorageError> {
        let mut logs = self.logs.write().await;
        let log = logs
            .get_mut(&event.assessment_uuid)
            .ok_or(StorageError::AssessmentNotFound(event.assessment_uuid))?;

        conflict::check_next_sequence(log, event)?;
        log.push(event.clone());
        Ok(())
    }

    /// A snapshot of the log; later appends are not visible through it.
    pub async fn load(&self, assessment_uuid: Uuid) -> Result<Vec<StoredEvent>, StorageError> {
        self.logs
            .read()
            .await
            .get(&assessment_uuid)
            .cloned()
            .ok_or(StorageError::AssessmentNotFound(assessment_uuid))
    }

    pub async fn claim_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        let mut identifiers = self.identifiers.write().await;
        let key = (identifier_type.to_string(), identifier.to_string());
        match identifiers.entry(key) {
            Entry::Occupied(existing) => conflict::claim_outcome(
                Some(*existing.get()),
                identifier_type,
                identifier,
                assessment_uuid,
            ),
            Entry::Vacant(slot) => {
                slot.insert(assessment_uuid);
                Ok(())
            }
        }
    }

    /// Drop a claim, but only while it still names `assessment_uuid`.
    pub async fn release_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        let mut identifiers = self.identifiers.write().await;
        let key = (identifier_type.to_string(), identifier.to_string());
        if let Entry::Occupied(existing) = identifiers.entry(key)
            && *existing.get() == assessment_uuid
        {
            existing.remove();
        }
        Ok(())
    }

    pub async fn find_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
    ) -> Result<Option<Uuid>, StorageError> {
        let identifiers = self.identifiers.read().await;
        Ok(identifiers
            .get(&(identifier_type.to_string(), identifier.to_string()))
            .copied())
    }
}

use uuid::Uuid;

use aap_core::models::event::StoredEvent;

use crate::error::StorageError;
use crate::memory::MemoryEventStore;
use crate::s3::S3EventStore;

/// The Aggregate Store.
///
/// Each assessment owns one append-only log. `create` writes the first event,
/// `append` adds the event whose `sequence` directly follows the last stored
/// one (anything else is a [`StorageError::SequenceConflict`]), and `load`
/// returns a consistent snapshot of the whole log.
#[derive(Debug)]
pub enum EventStore {
    Memory(MemoryEventStore),
    S3(S3EventStore),
}

impl EventStore {
    pub fn memory() -> Self {
        EventStore::Memory(MemoryEventStore::new())
    }

    pub fn backend(&self) -> &'static str {
        match self {
            EventStore::Memory(_) => "memory",
            EventStore::S3(_) => "s3",
        }
    }

    pub async fn create(&self, event: &StoredEvent) -> Result<(), StorageError> {
        match self {
            EventStore::Memory(store) => store.create(event).await,
            EventStore::S3(store) => store.create(event).await,
        }
    }

    pub async fn append(&self, event: &StoredEvent) -> Result<(), StorageError> {
        match self {
            EventStore::Memory(store) => store.append(event).await,
            EventStore::S3(store) => store.append(event).await,
        }
    }

    pub async fn load(&self, assessment_uuid: Uuid) -> Result<Vec<StoredEvent>, StorageError> {
        match self {
            EventStore::Memory(store) => store.load(assessment_uuid).await,
            EventStore::S3(store) => store.load(assessment_uuid).await,
        }
    }

    /// Bind an external identifier to an assessment. Re-claiming for the same
    /// assessment succeeds; claiming one bound elsewhere is
    /// [`StorageError::IdentifierTaken`].
    pub async fn claim_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        match self {
            EventStore::Memory(store) => {
                store
                    .claim_identifier(identifier_type, identifier, assessment_uuid)
                    .await
            }
            EventStore::S3(store) => {
                store
                    .claim_identifier(identifier_type, identifier, assessment_uuid)
                    .await
            }
        }
    }

    /// Undo a claim made for `assessment_uuid`. A claim held by any other
    /// assessment is left alone.
    pub async fn release_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
        assessment_uuid: Uuid,
    ) -> Result<(), StorageError> {
        match self {
            EventStore::Memory(store) => {
                store
                    .release_identifier(identifier_type, identifier, assessment_uuid)
                    .await
            }
            EventStore::S3(store) => {
                store
                    .release_identifier(identifier_type, identifier, assessment_uuid)
                    .await
            }
        }
    }

    pub async fn find_identifier(
        &self,
        identifier_type: &str,
        identifier: &str,
    ) -> Result<Option<Uuid>, StorageError> {
        match self {
            EventStore::Memory(store) => store.find_identifier(identifier_type, identifier).await,
            EventStore::S3(store) => store.find_identifier(identifier_type, identifier).await,
        }
    }
}

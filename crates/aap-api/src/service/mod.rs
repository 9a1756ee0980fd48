//! Command and query handling over an [`EventStore`].

mod commands;
mod locks;
mod queries;

use thiserror::Error;
use uuid::Uuid;

use aap_core::error::CoreError;
use aap_core::models::event::StoredEvent;
use aap_core::projector::{project, Projection};
use aap_core::time::ServerTimestamp;
use aap_storage::error::StorageError;
use aap_storage::store::EventStore;

pub use locks::AssessmentLocks;

/// Why one command or query failed. Reported on that item only.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct AssessmentService {
    store: EventStore,
    locks: AssessmentLocks,
}

impl AssessmentService {
    pub fn new(store: EventStore) -> Self {
        Self {
            store,
            locks: AssessmentLocks::default(),
        }
    }

    /// Load an assessment's log. A missing log is reported as the domain's
    /// not-found error so messages match whichever store is in use.
    async fn load(&self, assessment_uuid: Uuid) -> Result<Vec<StoredEvent>, ServiceError> {
        match self.store.load(assessment_uuid).await {
            Ok(events) => Ok(events),
            Err(StorageError::AssessmentNotFound(uuid)) => {
                Err(CoreError::AssessmentNotFound(uuid).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Project `events` and log anything the projector had to leave out.
fn project_logged(
    assessment_uuid: Uuid,
    events: &[StoredEvent],
    cutoff: Option<ServerTimestamp>,
) -> Projection {
    let projection = project(events, cutoff);
    for skipped in &projection.skipped {
        tracing::warn!(
            assessment_uuid = %assessment_uuid,
            event_uuid = %skipped.event_uuid,
            sequence = skipped.sequence,
            event_type = %skipped.event_type,
            reason = ?skipped.reason,
            "skipped event during projection"
        );
    }
    projection
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-assessment command locks.
///
/// A batch takes the locks of every assessment it names, in ascending UUID
/// order so two batches can never wait on each other in a cycle.
#[derive(Debug, Default)]
pub struct AssessmentLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl AssessmentLocks {
    pub async fn acquire(
        &self,
        assessment_uuids: impl IntoIterator<Item = Uuid>,
    ) -> Vec<OwnedMutexGuard<()>> {
        let mut uuids: Vec<Uuid> = assessment_uuids.into_iter().collect();
        uuids.sort();
        uuids.dedup();

        let mutexes: Vec<Arc<AsyncMutex<()>>> = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Unreferenced entries have no holder and no waiter.
            locks.retain(|_, m| Arc::strong_count(m) > 1);
            uuids
                .iter()
                .map(|uuid| locks.entry(*uuid).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        guards
    }

    /// Number of assessments with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

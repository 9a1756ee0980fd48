//! Aggregate version identifiers.
//!
//! An `aggregateUuid` names one folded state of an assessment. It is a UUIDv5
//! over the previous version, the event that produced this state, and the
//! canonical JSON of the state itself. Replaying the same log prefix always
//! yields the same identifier, and every applied event yields a new one even
//! when it leaves the folded content unchanged.

use uuid::Uuid;

use crate::models::assessment::AssessmentVersion;

/// Namespace for aggregate version UUIDs.
pub const AGGREGATE_NAMESPACE: Uuid = Uuid::from_u128(0x6a3f_1c2e_9b47_5d80_a1e4_27c9_53f0_b816);

pub fn next_aggregate_uuid(
    previous: Option<Uuid>,
    event_uuid: Uuid,
    state: &AssessmentVersion,
) -> Uuid {
    // Maps and vectors only; BTreeMap keeps the encoding stable.
    let digest = serde_json::to_vec(state).unwrap_or_default();

    let mut name = Vec::with_capacity(32 + digest.len());
    name.extend_from_slice(previous.unwrap_or(Uuid::nil()).as_bytes());
    name.extend_from_slice(event_uuid.as_bytes());
    name.extend_from_slice(&digest);
    Uuid::new_v5(&AGGREGATE_NAMESPACE, &name)
}

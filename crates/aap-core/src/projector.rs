//! Folds an assessment's event log into a versioned read model.
//!
//! Projection is total: an event that cannot be decoded or applied is left
//! out and reported in [`Projection::skipped`], never returned as an error.

use uuid::Uuid;

use crate::models::assessment::{merge_values, AssessmentVersion, Collection, CollectionItem};
use crate::models::event::{DomainEvent, StoredEvent};
use crate::models::timeline::TimelineEntry;
use crate::time::ServerTimestamp;
use crate::version::next_aggregate_uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Written by a newer build; ignored.
    UnknownType,
    /// The payload does not decode for its event type.
    Malformed(String),
    /// The payload decoded but does not apply to the state at that point.
    Inapplicable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub event_uuid: Uuid,
    pub sequence: u64,
    pub event_type: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct Projection {
    /// `None` when no creation event has been applied.
    pub state: Option<AssessmentVersion>,
    /// One entry per applied event, in log order.
    pub timeline: Vec<TimelineEntry>,
    pub skipped: Vec<SkippedEvent>,
}

/// Fold `events` in sequence order, stopping after the last event at or
/// before `cutoff`.
///
/// The creation event is always applied: an assessment exists from its
/// creation onwards, so a cutoff earlier than creation yields the freshly
/// created state rather than nothing.
pub fn project(events: &[StoredEvent], cutoff: Option<ServerTimestamp>) -> Projection {
    let mut ordered: Vec<&StoredEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.sequence);

    let mut projection = Projection::default();
    for event in ordered {
        if let Some(cutoff) = cutoff {
            if event.created_at > cutoff && projection.state.is_some() {
                break;
            }
        }

        let skip = |reason: SkipReason| SkippedEvent {
            event_uuid: event.event_uuid,
            sequence: event.sequence,
            event_type: event.event_type.clone(),
            reason,
        };

        let domain = match DomainEvent::decode(&event.event_type, &event.data) {
            Ok(Some(domain)) => domain,
            Ok(None) => {
                projection.skipped.push(skip(SkipReason::UnknownType));
                continue;
            }
            Err(e) => {
                projection.skipped.push(skip(SkipReason::Malformed(e.to_string())));
                continue;
            }
        };

        let previous = projection.state.as_ref().map(|s| s.aggregate_uuid);
        if let Err(reason) = apply(&mut projection.state, event, &domain) {
            projection.skipped.push(skip(SkipReason::Inapplicable(reason)));
            continue;
        }

        if let Some(state) = projection.state.as_mut() {
            state.updated_at = event.created_at;
            state.add_collaborator(&event.user);
            state.aggregate_uuid = next_aggregate_uuid(previous, event.event_uuid, state);
        }

        projection.timeline.push(TimelineEntry {
            event_uuid: event.event_uuid,
            sequence: event.sequence,
            timestamp: event.created_at,
            user: event.user.clone(),
            event_type: event.event_type.clone(),
            custom_type: event.timeline.as_ref().map(|t| t.custom_type.clone()),
            custom_data: event.timeline.as_ref().and_then(|t| t.data.clone()),
        });
    }

    projection
}

/// Apply one decoded event. Leaves `state` untouched on error.
fn apply(
    state: &mut Option<AssessmentVersion>,
    event: &StoredEvent,
    domain: &DomainEvent,
) -> Result<(), String> {
    let at = event.created_at;

    if let DomainEvent::AssessmentCreated(created) = domain {
        if state.is_some() {
            return Err("assessment already created".to_string());
        }
        *state = Some(AssessmentVersion {
            assessment_uuid: event.assessment_uuid,
            aggregate_uuid: Uuid::nil(),
            assessment_type: created.assessment_type.clone(),
            form_version: created.form_version.clone(),
            created_at: at,
            updated_at: at,
            answers: Default::default(),
            properties: created.properties.clone(),
            collections: Vec::new(),
            collaborators: Vec::new(),
            identifiers: created.identifiers.clone(),
        });
        return Ok(());
    }

    let state = state
        .as_mut()
        .ok_or_else(|| "event precedes assessment creation".to_string())?;
    if state.assessment_uuid != event.assessment_uuid {
        return Err(format!(
            "event belongs to assessment {}",
            event.assessment_uuid
        ));
    }

    match domain {
        DomainEvent::AssessmentCreated(_) => {
            return Err("assessment already created".to_string());
        }
        DomainEvent::AnswersUpdated(change) => {
            merge_values(&mut state.answers, &change.added, &change.removed);
        }
        DomainEvent::PropertiesUpdated(change) => {
            merge_values(&mut state.properties, &change.added, &change.removed);
        }
        DomainEvent::CollectionCreated(created) => {
            if state.collection(created.collection_uuid).is_some() {
                return Err(format!("collection {} already exists", created.collection_uuid));
            }
            state.collections.push(Collection {
                uuid: created.collection_uuid,
                name: created.name.clone(),
                created_at: at,
                updated_at: at,
                items: Vec::new(),
            });
        }
        DomainEvent::CollectionItemAdded(added) => {
            if state.find_item(added.collection_item_uuid).is_some() {
                return Err(format!(
                    "collection item {} already exists",
                    added.collection_item_uuid
                ));
            }
            let collection = state
                .collection_mut(added.collection_uuid)
                .ok_or_else(|| format!("unknown collection {}", added.collection_uuid))?;
            collection.items.push(CollectionItem {
                uuid: added.collection_item_uuid,
                created_at: at,
                updated_at: at,
                answers: added.answers.clone(),
                properties: added.properties.clone(),
            });
            collection.updated_at = at;
        }
        DomainEvent::CollectionItemAnswersUpdated(change) => {
            let (collection, index) = state
                .item_mut(change.collection_item_uuid)
                .ok_or_else(|| format!("unknown collection item {}", change.collection_item_uuid))?;
            let item = &mut collection.items[index];
            merge_values(&mut item.answers, &change.added, &change.removed);
            item.updated_at = at;
            collection.updated_at = at;
        }
        DomainEvent::CollectionItemPropertiesUpdated(change) => {
            let (collection, index) = state
                .item_mut(change.collection_item_uuid)
                .ok_or_else(|| format!("unknown collection item {}", change.collection_item_uuid))?;
            let item = &mut collection.items[index];
            merge_values(&mut item.properties, &change.added, &change.removed);
            item.updated_at = at;
            collection.updated_at = at;
        }
        DomainEvent::CollectionItemRemoved(removed) => {
            let (collection, index) = state
                .item_mut(removed.collection_item_uuid)
                .ok_or_else(|| format!("unknown collection item {}", removed.collection_item_uuid))?;
            collection.items.remove(index);
            collection.updated_at = at;
        }
    }

    Ok(())
}

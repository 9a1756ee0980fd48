//! Turns a validated command into the event it should append.
//!
//! Pure: the caller loads the current state, asks for a [`Decision`], and
//! is responsible for persisting the event.

use uuid::Uuid;

use crate::error::CoreError;
use crate::models::assessment::AssessmentVersion;
use crate::models::command::{Command, CommandResult};
use crate::models::event::{
    AssessmentCreated, CollectionCreated, CollectionItemAdded, CollectionItemChanged,
    CollectionItemRemoved, DomainEvent, ValuesChanged,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Append `event` to `assessment_uuid`'s log; report `result` once stored.
    Append {
        assessment_uuid: Uuid,
        event: DomainEvent,
        result: CommandResult,
    },
    /// The command is satisfied by the current state; nothing to append.
    Unchanged { result: CommandResult },
}

/// Decide what `command` does to `state`.
///
/// `state` is the latest projection of the assessment the command names, or
/// `None` when that assessment does not exist. It is ignored for creation.
pub fn decide(
    command: &Command,
    state: Option<&AssessmentVersion>,
) -> Result<Decision, CoreError> {
    let result_type = command.result_type();

    if let Command::CreateAssessment(create) = command {
        let assessment_uuid = Uuid::new_v4();
        return Ok(Decision::Append {
            assessment_uuid,
            event: DomainEvent::AssessmentCreated(AssessmentCreated {
                form_version: create.form_version.clone(),
                assessment_type: create.assessment_type.clone(),
                properties: create.properties.clone(),
                identifiers: create.identifiers.clone(),
            }),
            result: CommandResult::succeeded(
                result_type,
                format!("Assessment created with UUID {assessment_uuid}"),
            )
            .with_assessment(assessment_uuid),
        });
    }

    let Some(assessment_uuid) = command.assessment_uuid() else {
        return Err(CoreError::MissingField("assessmentUuid".to_string()));
    };
    let state = state
        .filter(|s| s.assessment_uuid == assessment_uuid)
        .ok_or(CoreError::AssessmentNotFound(assessment_uuid))?;

    let append = |event: DomainEvent, result: CommandResult| Decision::Append {
        assessment_uuid,
        event,
        result: result.with_assessment(assessment_uuid),
    };

    let decision = match command {
        Command::CreateAssessment(_) => {
            return Err(CoreError::InvalidRequest {
                request_type: result_type,
                reason: "creation handled above".to_string(),
            });
        }
        Command::UpdateAnswers(update) => append(
            DomainEvent::AnswersUpdated(ValuesChanged {
                added: update.added.clone(),
                removed: update.removed.clone(),
            }),
            CommandResult::succeeded(
                result_type,
                format!("Updated answers on assessment {assessment_uuid}"),
            ),
        ),
        Command::UpdateProperties(update) => append(
            DomainEvent::PropertiesUpdated(ValuesChanged {
                added: update.added.clone(),
                removed: update.removed.clone(),
            }),
            CommandResult::succeeded(
                result_type,
                format!("Updated properties on assessment {assessment_uuid}"),
            ),
        ),
        Command::CreateCollection(create) => {
            if let Some(existing) = state.collection_named(&create.name) {
                return Ok(Decision::Unchanged {
                    result: CommandResult::succeeded(
                        result_type,
                        format!(
                            "Collection '{}' already exists with UUID {}",
                            existing.name, existing.uuid
                        ),
                    )
                    .with_assessment(assessment_uuid)
                    .with_collection(existing.uuid),
                });
            }
            let collection_uuid = Uuid::new_v4();
            append(
                DomainEvent::CollectionCreated(CollectionCreated {
                    collection_uuid,
                    name: create.name.clone(),
                }),
                CommandResult::succeeded(
                    result_type,
                    format!("Collection '{}' created with UUID {collection_uuid}", create.name),
                )
                .with_collection(collection_uuid),
            )
        }
        Command::AddCollectionItem(add) => {
            if state.collection(add.collection_uuid).is_none() {
                return Err(CoreError::CollectionNotFound {
                    collection_uuid: add.collection_uuid,
                    assessment_uuid,
                });
            }
            let collection_item_uuid = Uuid::new_v4();
            append(
                DomainEvent::CollectionItemAdded(CollectionItemAdded {
                    collection_uuid: add.collection_uuid,
                    collection_item_uuid,
                    properties: add.properties.clone(),
                    answers: add.answers.clone(),
                }),
                CommandResult::succeeded(
                    result_type,
                    format!(
                        "Added item {collection_item_uuid} to collection {}",
                        add.collection_uuid
                    ),
                )
                .with_collection(add.collection_uuid)
                .with_collection_item(collection_item_uuid),
            )
        }
        Command::UpdateCollectionItemAnswers(update)
        | Command::UpdateCollectionItemProperties(update) => {
            let Some((collection, _)) = state.find_item(update.collection_item_uuid) else {
                return Err(CoreError::CollectionItemNotFound {
                    item_uuid: update.collection_item_uuid,
                    assessment_uuid,
                });
            };
            let change = CollectionItemChanged {
                collection_item_uuid: update.collection_item_uuid,
                added: update.added.clone(),
                removed: update.removed.clone(),
            };
            let event = if matches!(command, Command::UpdateCollectionItemAnswers(_)) {
                DomainEvent::CollectionItemAnswersUpdated(change)
            } else {
                DomainEvent::CollectionItemPropertiesUpdated(change)
            };
            append(
                event,
                CommandResult::succeeded(
                    result_type,
                    format!("Updated collection item {}", update.collection_item_uuid),
                )
                .with_collection(collection.uuid)
                .with_collection_item(update.collection_item_uuid),
            )
        }
        Command::RemoveCollectionItem(remove) => {
            let Some((collection, _)) = state.find_item(remove.collection_item_uuid) else {
                return Err(CoreError::CollectionItemNotFound {
                    item_uuid: remove.collection_item_uuid,
                    assessment_uuid,
                });
            };
            append(
                DomainEvent::CollectionItemRemoved(CollectionItemRemoved {
                    collection_item_uuid: remove.collection_item_uuid,
                }),
                CommandResult::succeeded(
                    result_type,
                    format!(
                        "Removed item {} from collection {}",
                        remove.collection_item_uuid, collection.uuid
                    ),
                )
                .with_collection(collection.uuid)
                .with_collection_item(remove.collection_item_uuid),
            )
        }
    };

    Ok(decision)
}

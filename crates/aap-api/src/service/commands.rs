use std::collections::BTreeMap;

use serde_json::Value;

use aap_audit::events::AuditEvent;
use aap_core::decide::{decide, Decision};
use aap_core::error::CoreError;
use aap_core::models::command::{
    result_type_for, Command, CommandBatch, CommandBatchResponse, CommandResponse, CommandResult,
};
use aap_core::models::event::StoredEvent;
use aap_core::time::ServerTimestamp;
use aap_storage::conflict;

use super::{project_logged, AssessmentService, ServiceError};

impl AssessmentService {
    /// Apply a batch in array order.
    ///
    /// Every assessment the batch names stays locked until the last command
    /// has been applied, so each command sees exactly the state left by the
    /// ones before it. A failing command is reported on its own result and
    /// does not stop the rest.
    pub async fn execute_commands(
        &self,
        batch: CommandBatch,
        principal: &str,
    ) -> CommandBatchResponse {
        let decoded: Vec<(Value, Result<Command, CoreError>)> = batch
            .commands
            .into_iter()
            .map(|raw| {
                let command = Command::decode(&raw);
                (raw, command)
            })
            .collect();

        let _guards = self
            .locks
            .acquire(
                decoded
                    .iter()
                    .filter_map(|(_, c)| c.as_ref().ok().and_then(Command::assessment_uuid)),
            )
            .await;

        let mut commands = Vec::with_capacity(decoded.len());
        for (raw, command) in decoded {
            let response = match command {
                Err(e) => {
                    tracing::debug!(error = %e, "rejected command");
                    CommandResponse {
                        result: CommandResult::failed(result_type_for(&raw), e.to_string()),
                        request: raw,
                    }
                }
                Ok(command) => {
                    let result = match self.apply(&command, principal).await {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::info!(
                                command_type = command.command_type(),
                                error = %e,
                                "command failed"
                            );
                            CommandResult::failed(command.result_type(), e.to_string())
                        }
                    };
                    CommandResponse {
                        request: serde_json::to_value(&command).unwrap_or(raw),
                        result,
                    }
                }
            };
            commands.push(response);
        }

        CommandBatchResponse { commands }
    }

    async fn apply(&self, command: &Command, principal: &str) -> Result<CommandResult, ServiceError> {
        let (events, state) = match command.assessment_uuid() {
            Some(uuid) => match self.load(uuid).await {
                Ok(events) => {
                    let state = project_logged(uuid, &events, None).state;
                    (events, state)
                }
                // decide() reports the missing assessment.
                Err(ServiceError::Core(CoreError::AssessmentNotFound(_))) => (Vec::new(), None),
                Err(e) => return Err(e),
            },
            None => (Vec::new(), None),
        };

        let (assessment_uuid, event, result) = match decide(command, state.as_ref())? {
            Decision::Unchanged { result } => return Ok(result),
            Decision::Append {
                assessment_uuid,
                event,
                result,
            } => (assessment_uuid, event, result),
        };

        let last = events.last();
        let stored = StoredEvent::new(
            assessment_uuid,
            last.map(|e| e.sequence).unwrap_or(0) + 1,
            command.command_type(),
            &event,
            command.user(),
            command.timeline().cloned(),
            ServerTimestamp::next_after(last.map(|e| e.created_at)),
        )?;

        if let Command::CreateAssessment(create) = command {
            self.create_with_identifiers(&stored, &create.identifiers).await?;
        } else {
            self.store.append(&stored).await?;
        }

        AuditEvent::applied(&stored, principal).emit();
        Ok(result)
    }

    /// Claim every identifier, then write the first event. Any failure
    /// releases the claims this call made, so a failed create leaves no
    /// identifier bound to an assessment without a log.
    async fn create_with_identifiers(
        &self,
        stored: &StoredEvent,
        identifiers: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        let assessment_uuid = stored.assessment_uuid;
        for (identifier_type, identifier) in identifiers {
            if let Some(owner) = self
                .store
                .find_identifier(identifier_type, identifier)
                .await?
            {
                conflict::claim_outcome(Some(owner), identifier_type, identifier, assessment_uuid)?;
            }
        }

        let mut claimed = Vec::with_capacity(identifiers.len());
        let mut outcome = Ok(());
        for (identifier_type, identifier) in identifiers {
            match self
                .store
                .claim_identifier(identifier_type, identifier, assessment_uuid)
                .await
            {
                Ok(()) => claimed.push((identifier_type, identifier)),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        if outcome.is_ok() {
            outcome = self.store.create(stored).await;
        }

        if outcome.is_err() {
            for (identifier_type, identifier) in claimed {
                if let Err(e) = self
                    .store
                    .release_identifier(identifier_type, identifier, assessment_uuid)
                    .await
                {
                    tracing::error!(
                        %assessment_uuid,
                        identifier_type = %identifier_type,
                        identifier = %identifier,
                        error = %e,
                        "failed to release identifier claim"
                    );
                }
            }
        }
        outcome.map_err(ServiceError::from)
    }
}

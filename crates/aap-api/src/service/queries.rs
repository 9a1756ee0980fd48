use serde_json::Value;
use uuid::Uuid;

use aap_core::error::CoreError;
use aap_core::models::identifier::{validate_identifier, AssessmentIdentifier};
use aap_core::models::query::{
    CollectionResult, Query, QueryBatch, QueryBatchResponse, QueryResponse, QueryResult,
    TimelineResult,
};

use super::{project_logged, AssessmentService, ServiceError};

impl AssessmentService {
    /// Answer each query against a snapshot of its assessment's log. Queries
    /// never take command locks.
    pub async fn execute_queries(&self, batch: QueryBatch) -> QueryBatchResponse {
        let mut queries = Vec::with_capacity(batch.queries.len());
        for raw in batch.queries {
            let response = match Query::decode(&raw) {
                Err(e) => {
                    let query_type = raw
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("UnknownQuery")
                        .to_string();
                    QueryResponse {
                        result: QueryResult::failed(query_type, e.to_string()),
                        request: raw,
                    }
                }
                Ok(mut query) => {
                    let result = match self.answer(&mut query).await {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::info!(
                                query_type = query.query_type(),
                                error = %e,
                                "query failed"
                            );
                            QueryResult::failed(query.query_type(), e.to_string())
                        }
                    };
                    QueryResponse {
                        request: serde_json::to_value(&query).unwrap_or(raw),
                        result,
                    }
                }
            };
            queries.push(response);
        }
        QueryBatchResponse { queries }
    }

    async fn answer(&self, query: &mut Query) -> Result<QueryResult, ServiceError> {
        let target = query.normalize()?;
        let assessment_uuid = self.resolve(&target).await?;
        let events = self.load(assessment_uuid).await?;

        let projection = project_logged(assessment_uuid, &events, query.cutoff());
        let state = projection
            .state
            .ok_or(CoreError::AssessmentNotFound(assessment_uuid))?;

        let result = match query {
            Query::AssessmentVersion(_) => QueryResult::AssessmentVersion(state),
            Query::Timeline(q) => {
                let timeline = projection
                    .timeline
                    .into_iter()
                    .filter(|entry| {
                        q.include_custom_types.is_empty()
                            || entry
                                .custom_type
                                .as_ref()
                                .is_some_and(|t| q.include_custom_types.contains(t))
                    })
                    .collect();
                QueryResult::Timeline(TimelineResult {
                    assessment_uuid,
                    timeline,
                })
            }
            Query::Collection(q) => {
                let collection = state
                    .collection_named(&q.collection_name)
                    .cloned()
                    .ok_or_else(|| CoreError::CollectionNameNotFound {
                        name: q.collection_name.clone(),
                        assessment_uuid,
                    })?;
                QueryResult::Collection(CollectionResult {
                    assessment_uuid,
                    aggregate_uuid: state.aggregate_uuid,
                    collection,
                })
            }
        };
        Ok(result)
    }

    async fn resolve(&self, target: &AssessmentIdentifier) -> Result<Uuid, ServiceError> {
        match target {
            AssessmentIdentifier::Uuid { uuid } => Ok(*uuid),
            AssessmentIdentifier::External {
                identifier_type,
                identifier,
            } => {
                validate_identifier(identifier_type, identifier)?;
                self.store
                    .find_identifier(identifier_type, identifier)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::from(CoreError::IdentifierNotFound {
                            identifier_type: identifier_type.clone(),
                            identifier: identifier.clone(),
                        })
                    })
            }
        }
    }
}

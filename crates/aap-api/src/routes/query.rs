use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use aap_core::models::query::{QueryBatch, QueryBatchResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /query`.
pub async fn handle_queries(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueryBatchResponse>, ApiError> {
    let batch: QueryBatch = serde_json::from_slice(&body)?;
    Ok(Json(state.service.execute_queries(batch).await))
}

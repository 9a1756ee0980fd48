use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};

use aap_core::models::command::{CommandBatch, CommandBatchResponse};

use crate::error::ApiError;
use crate::middleware::auth::Caller;
use crate::state::AppState;

/// `POST /command`. The body is parsed here rather than through `Json` so a
/// malformed batch is a plain 400 with an error body.
pub async fn handle_commands(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<Json<CommandBatchResponse>, ApiError> {
    let batch: CommandBatch = serde_json::from_slice(&body)?;
    let response = state.service.execute_commands(batch, &caller.principal).await;
    Ok(Json(response))
}

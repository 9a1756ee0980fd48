use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware.
///
/// Verifies `Authorization: Bearer <token>` when a verifier is configured and
/// inserts the resulting [`Caller`] into request extensions. With auth
/// disabled every request runs as [`Caller::anonymous`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match &state.verifier {
        None => Caller::anonymous(),
        Some(verifier) => {
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            let claims = verifier.verify_header(header)?;
            Caller {
                principal: claims.principal().to_string(),
            }
        }
    };

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// The authenticated client behind a request.
#[derive(Clone, Debug)]
pub struct Caller {
    pub principal: String,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            principal: "anonymous".to_string(),
        }
    }
}

use std::sync::Arc;

use aap_auth::jwt::TokenVerifier;

use crate::service::AssessmentService;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AssessmentService>,
    /// `None` when authentication is disabled.
    pub verifier: Option<Arc<TokenVerifier>>,
}

impl AppState {
    pub fn new(service: AssessmentService, verifier: Option<TokenVerifier>) -> Self {
        Self {
            service: Arc::new(service),
            verifier: verifier.map(Arc::new),
        }
    }
}

use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::AuthError;

/// Claims carried by a client-credentials access token.
///
/// `authorities` holds the roles granted to the calling client
/// (e.g. `ROLE_AAP__COORDINATOR_RW`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
    #[serde(default)]
    pub iss: Option<String>,
    pub exp: u64,
}

impl ServiceClaims {
    /// Who is calling: the subject, else the OAuth2 client id.
    pub fn principal(&self) -> &str {
        self.sub
            .as_deref()
            .or(self.client_id.as_deref())
            .unwrap_or("unknown")
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.iter().any(|r| r == role)
    }
}

/// Verifies bearer tokens against one key, optional issuer and optional
/// required role.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    required_role: Option<String>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .field("required_role", &self.required_role)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Shared-secret verification. Used for local runs and tests.
    pub fn hs256(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Verification against the token server's RSA public key (PEM).
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::Config(format!("invalid RSA public key: {e}")))?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key,
            validation,
            required_role: None,
        }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_required_role(mut self, role: impl Into<String>) -> Self {
        self.required_role = Some(role.into());
        self
    }

    /// Validate signature, expiry, issuer and role.
    pub fn verify(&self, token: &str) -> Result<ServiceClaims, AuthError> {
        let token_data = decode::<ServiceClaims>(token, &self.key, &self.validation)?;
        let claims = token_data.claims;

        if let Some(role) = &self.required_role
            && !claims.has_role(role)
        {
            tracing::warn!(principal = %claims.principal(), role = %role, "token lacks required role");
            return Err(AuthError::MissingRole(role.clone()));
        }

        Ok(claims)
    }

    /// Verify the value of an `Authorization` header.
    pub fn verify_header(&self, header: Option<&str>) -> Result<ServiceClaims, AuthError> {
        let token = header.and_then(bearer_token).ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

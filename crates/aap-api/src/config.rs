use std::env;

use thiserror::Error;

use aap_auth::error::AuthError;
use aap_auth::jwt::TokenVerifier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be one of {allowed}, got '{value}'")]
    InvalidChoice {
        name: &'static str,
        allowed: &'static str,
        value: String,
    },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("cannot read {name} from {path}: {reason}")]
    Unreadable {
        name: &'static str,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    S3 {
        bucket: String,
        endpoint: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Disabled,
    Hs256 { secret: String },
    Rs256 { public_key_pem: String },
}

/// Service settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub issuer: Option<String>,
    pub required_role: Option<String>,
    /// Running under the Lambda runtime rather than as a plain server.
    pub lambda: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = match get("AAP_STORE").as_deref().unwrap_or("memory") {
            "memory" => StoreConfig::Memory,
            "s3" => StoreConfig::S3 {
                bucket: get("AAP_BUCKET").ok_or(ConfigError::Missing("AAP_BUCKET"))?,
                endpoint: get("AAP_S3_ENDPOINT"),
            },
            other => {
                return Err(ConfigError::InvalidChoice {
                    name: "AAP_STORE",
                    allowed: "memory, s3",
                    value: other.to_string(),
                });
            }
        };

        let auth = match get("AAP_AUTH").as_deref().unwrap_or("disabled") {
            "disabled" => AuthConfig::Disabled,
            "hs256" => AuthConfig::Hs256 {
                secret: get("AAP_JWT_SECRET").ok_or(ConfigError::Missing("AAP_JWT_SECRET"))?,
            },
            "rs256" => {
                let value =
                    get("AAP_JWT_PUBLIC_KEY").ok_or(ConfigError::Missing("AAP_JWT_PUBLIC_KEY"))?;
                AuthConfig::Rs256 {
                    public_key_pem: read_pem(value)?,
                }
            }
            other => {
                return Err(ConfigError::InvalidChoice {
                    name: "AAP_AUTH",
                    allowed: "disabled, hs256, rs256",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            bind_addr: get("AAP_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            store,
            auth,
            issuer: get("AAP_JWT_ISSUER"),
            required_role: get("AAP_REQUIRED_ROLE"),
            lambda: get("AWS_LAMBDA_RUNTIME_API").is_some(),
        })
    }

    /// The token verifier for the configured auth mode; `None` when disabled.
    pub fn verifier(&self) -> Result<Option<TokenVerifier>, AuthError> {
        let verifier = match &self.auth {
            AuthConfig::Disabled => return Ok(None),
            AuthConfig::Hs256 { secret } => TokenVerifier::hs256(secret.as_bytes()),
            AuthConfig::Rs256 { public_key_pem } => {
                TokenVerifier::rs256_pem(public_key_pem.as_bytes())?
            }
        };
        let verifier = match &self.issuer {
            Some(issuer) => verifier.with_issuer(issuer),
            None => verifier,
        };
        Ok(Some(match &self.required_role {
            Some(role) => verifier.with_required_role(role.clone()),
            None => verifier,
        }))
    }
}

/// `AAP_JWT_PUBLIC_KEY` holds either the PEM itself or a path to it.
fn read_pem(value: String) -> Result<String, ConfigError> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value);
    }
    std::fs::read_to_string(&value).map_err(|e| ConfigError::Unreadable {
        name: "AAP_JWT_PUBLIC_KEY",
        path: value.clone(),
        reason: e.to_string(),
    })
}

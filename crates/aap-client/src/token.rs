use std::env;
use std::fs;

use serde::Deserialize;

use crate::error::ClientError;

/// The token endpoint's response, as saved to disk by whatever fetched it.
#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
}

/// Read the bearer token from `AAP_TOKEN`, else from the JSON file named by
/// `AAP_TOKEN_FILE`. `None` when neither is set.
pub fn token_from_env() -> Result<Option<String>, ClientError> {
    token_from_lookup(|name| env::var(name).ok())
}

pub fn token_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<String>, ClientError> {
    if let Some(token) = lookup("AAP_TOKEN").filter(|t| !t.trim().is_empty()) {
        return Ok(Some(token.trim().to_string()));
    }
    let Some(path) = lookup("AAP_TOKEN_FILE").filter(|p| !p.trim().is_empty()) else {
        return Ok(None);
    };

    let raw = fs::read_to_string(&path)
        .map_err(|e| ClientError::Token(format!("cannot read {path}: {e}")))?;
    let file: TokenFile = serde_json::from_str(&raw)
        .map_err(|e| ClientError::Token(format!("{path} has no access_token: {e}")))?;
    Ok(Some(file.access_token))
}

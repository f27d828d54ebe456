// Token provider boundary: consume a bearer token from token.json or the
// API_TOKEN environment variable. Acquisition (browser extraction, manual
// paste) is external; this module only loads and validity-checks.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::CollectError;

/// A bearer token plus optional expiry, as written by the external token
/// extractor. Extra keys in token.json (retrieved_at, user, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
}

impl ApiToken {
    /// Fails with `ExpiredToken` when `expires_at` is in the past. Tokens
    /// without an expiry are accepted as-is.
    pub fn ensure_valid(&self, now: NaiveDateTime) -> Result<(), CollectError> {
        match self.expires_at {
            Some(expires_at) if expires_at <= now => {
                Err(CollectError::ExpiredToken { expired_at: expires_at })
            }
            Some(expires_at) => {
                debug!(expires_in = %(expires_at - now), "token validity checked");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Loads the token: file first, API_TOKEN environment variable second. An
/// unreadable or malformed token file logs a warning and falls through to the
/// environment; neither source yielding a token is `MissingToken`.
pub fn load_token(path: &Path) -> Result<ApiToken, CollectError> {
    if path.exists() {
        match read_token_file(path) {
            Ok(token) => {
                info!(path = %path.display(), "token loaded from file");
                return Ok(token);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "token file unreadable; trying API_TOKEN");
            }
        }
    }
    match std::env::var("API_TOKEN") {
        Ok(token) if !token.trim().is_empty() => {
            info!("token loaded from API_TOKEN environment variable");
            Ok(ApiToken {
                token: token.trim().to_string(),
                expires_at: None,
            })
        }
        _ => Err(CollectError::MissingToken),
    }
}

fn read_token_file(path: &Path) -> anyhow::Result<ApiToken> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: ApiToken = serde_json::from_str(&raw)?;
    anyhow::ensure!(!parsed.token.trim().is_empty(), "token field is empty");
    Ok(parsed)
}

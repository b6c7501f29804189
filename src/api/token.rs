//! Access token handling. The token is supplied from outside this program, either through the
//! `VCOST_ACCESS_TOKEN` environment variable or a `token.json` file in the secrets directory:
//!
//! ```json
//! {
//!   "access_token": "ya29.a0Af...",
//!   "expires_at": "2025-01-01T00:00:00Z"
//! }
//! ```

use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// When set and non-empty, this takes precedence over the token file.
pub(crate) const ACCESS_TOKEN_ENV: &str = "VCOST_ACCESS_TOKEN";

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct TokenFile {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl TokenFile {
    pub(crate) async fn load(p: impl AsRef<Path>) -> Res<Self> {
        let token_file: Self = utils::deserialize(p.as_ref())
            .await
            .context("Unable to deserialize the token JSON file")?;
        if token_file.access_token.trim().is_empty() {
            bail!("The token file does not contain an access token");
        }
        Ok(token_file)
    }

    pub(crate) fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Whether the token has an expiry time that has already passed.
    pub(crate) fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| t <= Utc::now())
    }
}

/// Resolves the access token, preferring the environment variable over the token file.
pub(crate) async fn access_token(token_path: &Path) -> Res<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("Using the access token from {ACCESS_TOKEN_ENV}");
            return Ok(token.trim().to_string());
        }
    }
    let token_file = TokenFile::load(token_path).await.with_context(|| {
        format!(
            "No access token found, set {ACCESS_TOKEN_ENV} or provide {}",
            token_path.display()
        )
    })?;
    if token_file.is_expired() {
        warn!(
            "The access token in {} has expired, requests will likely be rejected",
            token_path.display()
        );
    }
    Ok(token_file.access_token().to_string())
}

//! Persisted OAuth credential.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use oauth2::basic::BasicTokenResponse;
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DEFAULT_TOKEN_LIFETIME_SECS, TOKEN_EXPIRY_BUFFER_SECS};
use crate::error::Result;

/// Access/refresh token pair with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    /// Build a credential from a token endpoint response.
    ///
    /// Google omits `refresh_token` on refresh responses, so the caller's
    /// previous refresh token is carried over when none is returned.
    pub fn from_response(resp: &BasicTokenResponse, previous_refresh: Option<String>) -> Self {
        let scope = resp.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        });

        Self {
            access_token: resp.access_token().secret().clone(),
            refresh_token: resp
                .refresh_token()
                .map(|t| t.secret().clone())
                .or(previous_refresh),
            expires_at: expiry_after(resp.expires_in()),
            scope,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + TimeDelta::seconds(TOKEN_EXPIRY_BUFFER_SECS)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Expiry instant for a token valid for `expires_in`, falling back to the
/// default lifetime when the value is missing or out of range.
fn expiry_after(expires_in: Option<std::time::Duration>) -> DateTime<Utc> {
    let now = Utc::now();
    expires_in
        .and_then(|lifetime| TimeDelta::from_std(lifetime).ok())
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| now + TimeDelta::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
}

/// JSON file holding a single [`Credential`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential.
    ///
    /// A missing file yields `Ok(None)`. A file that cannot be parsed is
    /// reported and also yields `Ok(None)`, which sends the caller through
    /// a fresh authorization.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored token");
            return Ok(None);
        }

        let content = fs::read(&self.path)?;
        match serde_json::from_slice::<Credential>(&content) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable token file"
                );
                Ok(None)
            }
        }
    }

    /// Write the credential, replacing any previous content.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(credential)?;
        let mut file = open_private(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;

        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

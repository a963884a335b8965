//! Env-file credential loader.
//!
//! Parses a plain `KEY=VALUE` text file into the admin credential pair.
//! Blank lines and `#` comments are skipped, the first `=` splits key from
//! value, and both sides are trimmed. Malformed lines are skipped per line;
//! the load only fails when a required key is still unresolved at end of
//! file. Credential values are never logged.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::SmokeError;

/// Required env file key for the admin identifier.
pub const EMAIL_KEY: &str = "FIREBASE_ADMIN_EMAIL";

/// Required env file key for the admin secret.
pub const PASSWORD_KEY: &str = "FIREBASE_ADMIN_PASSWORD";

/// Admin credential pair loaded from the env file.
///
/// Both fields are guaranteed non-empty. Held only in process memory and
/// threaded through the flow as a local value.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Load the credential pair from `path`.
///
/// Returns `CredentialsMissing` when the file is absent or either required
/// key is unset or empty, never a partially-filled pair.
pub fn load(path: &Path) -> Result<Credentials, SmokeError> {
    info!("Looking for env file at: {}", path.display());

    if !path.exists() {
        debug!("env file not found at: {}", path.display());
        return Err(SmokeError::CredentialsMissing);
    }

    debug!("env file found, loading...");

    let content = std::fs::read_to_string(path)
        .map_err(|e| SmokeError::CredentialsMalformedFile(e.to_string()))?;

    let mut email: Option<String> = None;
    let mut password: Option<String> = None;

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!("skipping malformed env line {}", lineno + 1);
            continue;
        };

        let key = key.trim();
        let value = value.trim();

        match key {
            EMAIL_KEY => email = non_empty(value),
            PASSWORD_KEY => password = non_empty(value),
            _ => {}
        }
    }

    match (email, password) {
        (Some(email), Some(password)) => {
            info!("admin credentials loaded from {}", path.display());
            Ok(Credentials { email, password })
        }
        _ => {
            debug!("required keys unresolved in {}", path.display());
            Err(SmokeError::CredentialsMissing)
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

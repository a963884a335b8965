//! Wire types for the identity-toolkit sign-in endpoint.

use serde::{Deserialize, Serialize};

/// Sign-in request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInRequest {
    pub email: String,
    pub password: String,
    pub return_secure_token: bool,
}

/// Sign-in response from the identity provider
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInResponse {
    pub id_token: String,
    pub local_id: String,
    #[serde(default)]
    pub email: String,
}

/// Error payload shape returned by the identity provider
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDetail {
    pub message: String,
}

/// Authenticated session obtained from the identity provider.
///
/// Owned by the verifier for one write/read cycle; not renewed or cached.
#[derive(Clone)]
pub struct AuthSession {
    /// Stable user identifier, used to namespace the probe path.
    pub uid: String,
    /// Identifier echoed back by the provider.
    pub email: String,
    /// Bearer token for database calls.
    pub id_token: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

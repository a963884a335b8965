//! REST-backed client for the auth service and the realtime database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::client::{ReadyStatus, RtdbClient};
use super::types::{ApiErrorBody, AuthSession, SignInRequest, SignInResponse};
use crate::error::SmokeError;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Email/password sign-in endpoint of the identity toolkit
const SIGN_IN_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

/// Tool version (from Cargo.toml)
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// REST client for one smoke-test run.
///
/// Every operation is a single attempt: faults and timeouts are surfaced to
/// the caller, never retried.
pub struct FirebaseClient {
    http: Client,
    api_key: String,
    database_url: Url,
    user_agent: String,
    session_id: String,
}

impl FirebaseClient {
    /// Create a client for the given Web API key and database root URL.
    pub fn new(api_key: &str, database_url: &str) -> Result<Self> {
        let mut database_url = Url::parse(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?;

        // Url::join drops the last path segment without this.
        if !database_url.path().ends_with('/') {
            let path = format!("{}/", database_url.path());
            database_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            database_url,
            user_agent: format!("rtdb-smoke/{}", VERSION),
            session_id: Uuid::new_v4().to_string(),
        })
    }

    /// Build the REST URL for a node path relative to the database root.
    fn node_url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.database_url.join(&format!("{}.json", path))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", Uuid::new_v4().to_string())
            .header("x-request-session-id", &self.session_id)
    }
}

#[async_trait]
impl RtdbClient for FirebaseClient {
    async fn check_ready(&self) -> ReadyStatus {
        if self.api_key.trim().is_empty() {
            return ReadyStatus::Misconfigured("API key is empty".to_string());
        }

        let url = match self.database_url.join(".json") {
            Ok(url) => url,
            Err(e) => return ReadyStatus::Misconfigured(format!("invalid database URL: {}", e)),
        };

        debug!("=== Readiness Probe ===");
        debug!("URL: {}", url);

        // Unauthenticated shallow GET. Any HTTP answer, including a rules
        // denial, proves the service is reachable.
        match self
            .request(self.http.get(url))
            .query(&[("shallow", "true")])
            .send()
            .await
        {
            Ok(response) => {
                debug!("Readiness status: {}", response.status());
                ReadyStatus::Available
            }
            Err(e) => ReadyStatus::Unreachable(e.to_string()),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SmokeError> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
            return_secure_token: true,
        };

        debug!("=== Sign-In Request ===");
        debug!("URL: {}", SIGN_IN_URL);

        let response = self
            .request(self.http.post(SIGN_IN_URL))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SmokeError::AuthCanceled
                } else {
                    SmokeError::AuthFault(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("=== Sign-In Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            error!("Sign-in rejected with status {}: {}", status, detail);
            return Err(SmokeError::AuthFault(format!("HTTP {}: {}", status, detail)));
        }

        let resp: SignInResponse = response
            .json()
            .await
            .map_err(|e| SmokeError::AuthFault(format!("invalid sign-in response: {}", e)))?;

        if resp.id_token.is_empty() {
            return Err(SmokeError::AuthFault(
                "sign-in response does not contain a valid 'idToken' field".to_string(),
            ));
        }

        Ok(AuthSession {
            uid: resp.local_id,
            email: resp.email,
            id_token: resp.id_token,
        })
    }

    async fn write(
        &self,
        session: &AuthSession,
        path: &str,
        payload: &Value,
    ) -> Result<(), SmokeError> {
        let url = self
            .node_url(path)
            .map_err(|e| SmokeError::WriteFault(format!("invalid node path {}: {}", path, e)))?;

        debug!("=== Write Request ===");
        debug!("URL: {}", url);

        let response = self
            .request(self.http.put(url))
            .query(&[("auth", &session.id_token)])
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SmokeError::WriteCanceled
                } else {
                    SmokeError::WriteFault(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("Write status: {}", status);

        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SmokeError::WriteFault(format!("HTTP {}: {}", status, detail)));
        }

        Ok(())
    }

    async fn read(&self, session: &AuthSession, path: &str) -> Result<String, SmokeError> {
        let url = self
            .node_url(path)
            .map_err(|e| SmokeError::ReadFault(format!("invalid node path {}: {}", path, e)))?;

        debug!("=== Read Request ===");
        debug!("URL: {}", url);

        let response = self
            .request(self.http.get(url))
            .query(&[("auth", &session.id_token)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SmokeError::ReadCanceled
                } else {
                    SmokeError::ReadFault(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("Read status: {}", status);

        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SmokeError::ReadFault(format!("HTTP {}: {}", status, detail)));
        }

        response
            .text()
            .await
            .map_err(|e| SmokeError::ReadFault(format!("failed to read response body: {}", e)))
    }
}

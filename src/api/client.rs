//! Injectable capability trait for the external services.

use async_trait::async_trait;
use serde_json::Value;

use super::types::AuthSession;
use crate::error::SmokeError;

/// Outcome of the one-time dependency gate.
///
/// Only `Available` lets the flow proceed; any other status is terminal for
/// the run. No retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyStatus {
    /// Backend answered; safe to proceed.
    Available,
    /// Client-side configuration rules out any network call.
    Misconfigured(String),
    /// Transport-level failure reaching the backend.
    Unreachable(String),
}

impl std::fmt::Display for ReadyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadyStatus::Available => write!(f, "Available"),
            ReadyStatus::Misconfigured(msg) => write!(f, "Misconfigured: {}", msg),
            ReadyStatus::Unreachable(msg) => write!(f, "Unreachable: {}", msg),
        }
    }
}

/// External collaborators behind one seam: readiness check, sign-in, and the
/// tree-addressed write/read pair.
///
/// Paths are relative to the database root (e.g. `smokeTest/<uid>`); `read`
/// returns the store's raw serialized representation of the node verbatim.
#[async_trait]
pub trait RtdbClient {
    /// One-time readiness check, required before any other call.
    async fn check_ready(&self) -> ReadyStatus;

    /// Exchange the credential pair for an authenticated session. One attempt.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SmokeError>;

    /// Write `payload` at `path`. Server timestamp sentinels in the payload
    /// are resolved by the store at write time.
    async fn write(
        &self,
        session: &AuthSession,
        path: &str,
        payload: &Value,
    ) -> Result<(), SmokeError>;

    /// Read back the raw JSON stored at `path`.
    async fn read(&self, session: &AuthSession, path: &str) -> Result<String, SmokeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_status_display() {
        assert_eq!(ReadyStatus::Available.to_string(), "Available");
        assert_eq!(
            ReadyStatus::Unreachable("dns error".to_string()).to_string(),
            "Unreachable: dns error"
        );
    }
}

//! Failure taxonomy for the smoke-test pipeline.
//!
//! Each variant maps to the stage that detects it. Every failure is terminal
//! for the run: it is logged where it occurs and halts the remaining stages.

use thiserror::Error;

/// Stage-scoped failures for one smoke-test run.
#[derive(Debug, Error)]
pub enum SmokeError {
    /// The dependency gate reported a non-available status.
    #[error("backend dependencies unavailable: {0}")]
    DependenciesUnavailable(String),

    /// The env file is absent, or a required key is missing or empty.
    #[error("admin credentials not found in env file")]
    CredentialsMissing,

    /// The env file exists but could not be read.
    #[error("failed to read env file: {0}")]
    CredentialsMalformedFile(String),

    /// The identity provider rejected the sign-in attempt.
    #[error("sign-in failed: {0}")]
    AuthFault(String),

    /// The sign-in request was cut off before the provider responded.
    #[error("sign-in canceled: request timed out")]
    AuthCanceled,

    /// The probe write was rejected by the store.
    #[error("write failed: {0}")]
    WriteFault(String),

    /// The probe write was cut off in flight.
    #[error("write canceled: request timed out")]
    WriteCanceled,

    /// The read-back was rejected by the store.
    #[error("read failed: {0}")]
    ReadFault(String),

    /// The read-back was cut off in flight.
    #[error("read canceled: request timed out")]
    ReadCanceled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = SmokeError::DependenciesUnavailable("Unreachable: dns error".to_string());
        assert!(err.to_string().contains("Unreachable"));

        let err = SmokeError::AuthFault("HTTP 400: INVALID_PASSWORD".to_string());
        assert!(err.to_string().contains("INVALID_PASSWORD"));
    }
}

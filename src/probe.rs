//! Smoke-test flow: dependency gate, sign-in, then the write/read round trip.
//!
//! Control flows strictly top-to-bottom and each stage gates the next. The
//! whole flow is one logical task of four sequential awaited calls; no stage
//! ever overlaps another.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{AuthSession, ReadyStatus, RtdbClient};
use crate::envfile::Credentials;
use crate::error::SmokeError;

/// Tree root under which each user's probe document lives.
pub const PROBE_ROOT: &str = "smokeTest";

/// The fixed probe payload. `ts` is the server timestamp sentinel, resolved
/// by the store at write time.
pub fn probe_document() -> Value {
    json!({
        "hello": "world",
        "client": "unity",
        "ts": { ".sv": "timestamp" },
    })
}

/// Verifier progress. Failure states and `ReadOk` are terminal; there is no
/// transition back to `Idle` (single run per process).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Writing,
    WriteFailed,
    WriteOk,
    Reading,
    ReadFailed,
    ReadOk,
}

/// Result of a completed round trip.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// User id the probe was namespaced under.
    pub uid: String,
    /// Raw serialized node, as returned by the store.
    pub raw: String,
    /// Server-assigned timestamp resolved from the `ts` sentinel, if the
    /// read-back parsed.
    pub server_ts: Option<DateTime<Utc>>,
}

impl ProbeReport {
    fn from_raw(uid: String, raw: String) -> Self {
        let server_ts = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|doc| doc.get("ts").and_then(Value::as_i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Self {
            uid,
            raw,
            server_ts,
        }
    }
}

/// Round-trip verifier: writes the probe document under the authenticated
/// user's path, reads it back, and reports the raw representation.
pub struct RoundTrip<'a, C: RtdbClient> {
    client: &'a C,
    state: ProbeState,
}

impl<'a, C: RtdbClient> RoundTrip<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            state: ProbeState::Idle,
        }
    }

    /// Current verifier state, terminal after `run` returns.
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Write the probe document, then read it back. A write failure is
    /// terminal: the read is never issued. No rollback of a partial write.
    pub async fn run(&mut self, session: &AuthSession) -> Result<ProbeReport, SmokeError> {
        let path = format!("{}/{}", PROBE_ROOT, session.uid);
        let payload = probe_document();

        self.state = ProbeState::Writing;
        if let Err(e) = self.client.write(session, &path, &payload).await {
            self.state = ProbeState::WriteFailed;
            return Err(e);
        }
        self.state = ProbeState::WriteOk;
        info!("Write OK — reading back...");

        self.state = ProbeState::Reading;
        match self.client.read(session, &path).await {
            Ok(raw) => {
                self.state = ProbeState::ReadOk;
                Ok(ProbeReport::from_raw(session.uid.clone(), raw))
            }
            Err(e) => {
                self.state = ProbeState::ReadFailed;
                Err(e)
            }
        }
    }
}

/// Run the whole gated flow: readiness check, sign-in, round trip.
///
/// Credentials arrive as a local value from the loader; each stage failure is
/// logged by the caller and terminal for the run.
pub async fn run_smoke_test<C: RtdbClient>(
    client: &C,
    creds: &Credentials,
) -> Result<ProbeReport, SmokeError> {
    match client.check_ready().await {
        ReadyStatus::Available => info!("Backend ready"),
        status => {
            error!("Backend deps not available: {}", status);
            return Err(SmokeError::DependenciesUnavailable(status.to_string()));
        }
    }

    let session = client.sign_in(&creds.email, &creds.password).await?;
    info!("Signed in as {} ({})", session.uid, session.email);

    RoundTrip::new(client).run(&session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fake backend recording the call sequence. Write resolves the server
    /// timestamp sentinel the way the real store would.
    struct FakeClient {
        ready: ReadyStatus,
        fail_write: bool,
        fail_read: bool,
        calls: Mutex<Vec<String>>,
        stored: Mutex<Option<String>>,
    }

    impl FakeClient {
        fn new() -> Self {
            Self {
                ready: ReadyStatus::Available,
                fail_write: false,
                fail_read: false,
                calls: Mutex::new(Vec::new()),
                stored: Mutex::new(None),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl RtdbClient for FakeClient {
        async fn check_ready(&self) -> ReadyStatus {
            self.record("check_ready".to_string());
            self.ready.clone()
        }

        async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, SmokeError> {
            self.record("sign_in".to_string());
            Ok(AuthSession {
                uid: "U1".to_string(),
                email: email.to_string(),
                id_token: "tok".to_string(),
            })
        }

        async fn write(
            &self,
            _session: &AuthSession,
            path: &str,
            payload: &Value,
        ) -> Result<(), SmokeError> {
            self.record(format!("write {}", path));
            if self.fail_write {
                return Err(SmokeError::WriteFault("HTTP 401: Permission denied".to_string()));
            }

            let mut doc = payload.clone();
            doc["ts"] = json!(1_700_000_000_000_i64);
            *self.stored.lock().unwrap() = Some(doc.to_string());
            Ok(())
        }

        async fn read(&self, _session: &AuthSession, path: &str) -> Result<String, SmokeError> {
            self.record(format!("read {}", path));
            if self.fail_read {
                return Err(SmokeError::ReadFault("HTTP 503".to_string()));
            }
            Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
        }
    }

    fn creds() -> Credentials {
        Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_gate_failure_never_signs_in() {
        let mut client = FakeClient::new();
        client.ready = ReadyStatus::Unreachable("dns error".to_string());

        let err = run_smoke_test(&client, &creds()).await.unwrap_err();
        assert!(matches!(err, SmokeError::DependenciesUnavailable(_)));
        assert_eq!(client.calls(), vec!["check_ready"]);
    }

    #[tokio::test]
    async fn test_write_fault_never_reads() {
        let mut client = FakeClient::new();
        client.fail_write = true;

        let err = run_smoke_test(&client, &creds()).await.unwrap_err();
        assert!(matches!(err, SmokeError::WriteFault(_)));
        assert_eq!(
            client.calls(),
            vec!["check_ready", "sign_in", "write smokeTest/U1"]
        );
    }

    #[tokio::test]
    async fn test_round_trip_targets_user_path_and_resolves_sentinel() {
        let client = FakeClient::new();

        let report = run_smoke_test(&client, &creds()).await.unwrap();
        assert_eq!(report.uid, "U1");
        assert_eq!(
            client.calls(),
            vec![
                "check_ready",
                "sign_in",
                "write smokeTest/U1",
                "read smokeTest/U1"
            ]
        );

        let doc: Value = serde_json::from_str(&report.raw).unwrap();
        assert_eq!(doc["hello"], "world");
        assert_eq!(doc["client"], "unity");
        assert_eq!(doc["ts"], 1_700_000_000_000_i64);
        assert!(report.server_ts.is_some());
    }

    #[tokio::test]
    async fn test_verifier_terminal_states() {
        let client = FakeClient::new();
        let session = client.sign_in("a@b.com", "secret1").await.unwrap();

        let mut verifier = RoundTrip::new(&client);
        assert_eq!(verifier.state(), ProbeState::Idle);
        verifier.run(&session).await.unwrap();
        assert_eq!(verifier.state(), ProbeState::ReadOk);

        let mut failing = FakeClient::new();
        failing.fail_write = true;
        let mut verifier = RoundTrip::new(&failing);
        verifier.run(&session).await.unwrap_err();
        assert_eq!(verifier.state(), ProbeState::WriteFailed);

        let mut failing = FakeClient::new();
        failing.fail_read = true;
        let mut verifier = RoundTrip::new(&failing);
        verifier.run(&session).await.unwrap_err();
        assert_eq!(verifier.state(), ProbeState::ReadFailed);
    }

    #[test]
    fn test_probe_document_shape() {
        let doc = probe_document();
        assert_eq!(doc["hello"], "world");
        assert_eq!(doc["client"], "unity");
        assert_eq!(doc["ts"][".sv"], "timestamp");
    }
}

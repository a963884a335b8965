//! Client surface for the external auth and database services.
//!
//! The flow only ever talks to the backend through the [`RtdbClient`] trait,
//! so tests can substitute a fake implementation. [`FirebaseClient`] is the
//! real REST-backed implementation.

mod client;
mod firebase;
mod types;

pub use client::{ReadyStatus, RtdbClient};
pub use firebase::FirebaseClient;
pub use types::AuthSession;

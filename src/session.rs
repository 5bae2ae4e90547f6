//! Per-page session bootstrap.
//!
//! Protected pages resolve the current identity before rendering anything
//! data-dependent. The identity probe is raced against a fixed budget so a
//! hung backend cannot stall page loads; the losing future is discarded, not
//! cancelled.

use std::time::Duration;

use crate::backend::{Backend, Identity};

/// Fixed budget for the identity probe on protected page loads.
pub const SESSION_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of the bootstrap sequence for a protected page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// Backend handle withheld — render the configuration-required view.
    Unavailable,
    /// No token or the token did not resolve — redirect to sign-in.
    SignedOut,
    /// The probe exceeded its budget — backend unreachable, distinct from
    /// missing configuration.
    TimedOut,
    /// Identity resolved; proceed to the profile resolver.
    Ready(Identity),
}

/// Resolve the session for a protected page with the standard probe budget.
pub async fn resolve_session(backend: &Backend, access_token: Option<&str>) -> Bootstrap {
    resolve_session_within(backend, access_token, SESSION_PROBE_TIMEOUT).await
}

/// Resolve the session with an explicit probe budget.
pub async fn resolve_session_within(
    backend: &Backend,
    access_token: Option<&str>,
    probe: Duration,
) -> Bootstrap {
    let Some(client) = backend.client() else {
        return Bootstrap::Unavailable;
    };
    let Some(token) = access_token else {
        return Bootstrap::SignedOut;
    };

    match tokio::time::timeout(probe, client.current_user(token)).await {
        Err(_elapsed) => {
            tracing::warn!(budget_ms = probe.as_millis() as u64, "identity probe timed out");
            Bootstrap::TimedOut
        }
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "identity probe rejected; treating as signed out");
            Bootstrap::SignedOut
        }
        Ok(Ok(identity)) => Bootstrap::Ready(identity),
    }
}

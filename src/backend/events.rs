//! Auth-state change notifications.
//!
//! The code-exchange and sign-out paths publish onto a broadcast hub; pages
//! subscribe for their lifetime and redirect when an event carrying an active
//! session arrives. Dropping a listener releases the subscription — after
//! teardown no redirect may be emitted from it.

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::types::Session;

/// Kind of auth-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A single auth-state change: the event plus the session, when one exists.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

/// Broadcast hub for auth-state changes.
pub struct AuthEvents {
    tx: broadcast::Sender<AuthChange>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Publish a change. No subscribers means no waiting pages — not an error.
    pub fn publish(&self, change: AuthChange) {
        let _ = self.tx.send(change);
    }

    pub fn signed_in(&self, session: Session) {
        self.publish(AuthChange {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        });
    }

    pub fn signed_out(&self) {
        self.publish(AuthChange {
            kind: AuthEventKind::SignedOut,
            session: None,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.tx.subscribe()
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Page-scoped auth-state listener.
///
/// Forwards `target` into `redirects` whenever a change carrying an active
/// session arrives. The forwarding task is aborted on drop, so a torn-down
/// page can never receive a late redirect from a stale subscription.
pub struct AuthListener {
    handle: JoinHandle<()>,
}

impl AuthListener {
    pub fn spawn(
        events: &AuthEvents,
        target: impl Into<String>,
        redirects: mpsc::UnboundedSender<String>,
    ) -> Self {
        let mut rx = events.subscribe();
        let target = target.into();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        if change.session.is_some() && redirects.send(target.clone()).is_err() {
                            // Receiver gone — the page stopped waiting.
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "auth listener lagged behind broadcast");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Self { handle }
    }
}

impl Drop for AuthListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//! Client for the hosted auth/data backend.
//!
//! Everything that talks to the external service lives here: the typed
//! records, the configured-or-unavailable handle, the error-code
//! classification, and the auth-state broadcast.

pub mod client;
pub mod events;
pub mod fault;
pub mod types;

pub use client::{Backend, BackendClient};
pub use events::{AuthChange, AuthEventKind, AuthEvents, AuthListener};
pub use fault::{BackendFault, CODE_ROW_NOT_FOUND, CODE_SCHEMA_MISSING};
pub use types::{Identity, Profile, ProfileRecord, Session};

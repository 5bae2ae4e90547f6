//! Typed records exchanged with the hosted auth/data service.
//!
//! The service owns both entities; this app validates them at the serde
//! boundary instead of trusting loose JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user reference issued by the auth provider.
///
/// Created at sign-up and destroyed at account deletion, both outside this
/// app. Referenced but never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl Identity {
    /// Local part of the email address (`ana` for `ana@example.com`).
    ///
    /// Used as the greeting fallback when no profile row exists.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// An authenticated session returned by the code-for-session exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: Identity,
}

/// A stored profile row, at most one per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Upsert payload for the profile table.
///
/// Names are always present; numeric fields are serialized only when the user
/// provided them, so an omitted field stays NULL upstream rather than
/// becoming zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

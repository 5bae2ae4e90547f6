//! Classification of the backend's error vocabulary.
//!
//! The table REST interface reports failures through a small set of string
//! codes. Everything the rest of the crate needs to branch on is collapsed
//! here into a closed three-variant classification; no other module compares
//! against the service's codes directly.

use serde::Deserialize;

use crate::error::BackendError;

/// Code meaning the expected table does not exist in the backing store.
pub const CODE_SCHEMA_MISSING: &str = "PGRST205";

/// Code meaning a singular select matched zero rows.
pub const CODE_ROW_NOT_FOUND: &str = "PGRST116";

/// Error payload shape returned by the table REST interface.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// What a backend failure means for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFault {
    /// The profile table has not been created — deployment-time
    /// misconfiguration, surfaced as a remediation banner.
    SchemaMissing,
    /// The query matched zero rows — expected absence, not an error.
    RowNotFound,
    /// Anything else — logged and surfaced as a generic retry prompt.
    Other,
}

impl BackendFault {
    /// Classify a raw service error code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some(CODE_SCHEMA_MISSING) => Self::SchemaMissing,
            Some(CODE_ROW_NOT_FOUND) => Self::RowNotFound,
            _ => Self::Other,
        }
    }

    /// Classify a [`BackendError`]. Transport and decode failures are `Other`.
    pub fn of(err: &BackendError) -> Self {
        match err {
            BackendError::Service { code, .. } => Self::from_code(code.as_deref()),
            _ => Self::Other,
        }
    }
}

//! Profile upsert with outcome classification.

use crate::backend::{BackendClient, BackendFault, ProfileRecord};

/// What happened when the onboarding data was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Row created or overwritten — navigate to the dashboard.
    Saved,
    /// The profile table does not exist — show the remediation banner and
    /// stay on the current step.
    SchemaMissing,
    /// Any other failure — generic retry message, stay on the current step.
    Failed,
}

/// Upsert the profile row and classify the result.
///
/// Both the step-two "finish" and the step-one "skip to end" go through here;
/// they differ only in which fields the form carried.
pub async fn save_profile(
    client: &BackendClient,
    access_token: &str,
    record: &ProfileRecord,
) -> SaveOutcome {
    match client.upsert_profile(access_token, record).await {
        Ok(()) => SaveOutcome::Saved,
        Err(err) if BackendFault::of(&err) == BackendFault::SchemaMissing => {
            tracing::error!(user_id = %record.user_id, error = %err, "profile table missing");
            SaveOutcome::SchemaMissing
        }
        Err(err) => {
            tracing::error!(user_id = %record.user_id, error = %err, "profile upsert failed");
            SaveOutcome::Failed
        }
    }
}

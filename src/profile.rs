//! Profile lookup for protected pages.

use crate::backend::{BackendClient, BackendFault, Identity, Profile};

/// Schema-creation statement shown verbatim in the remediation banner when
/// the profile table is missing. The resolver and the onboarding writer must
/// display identical text.
pub const PROFILE_SCHEMA_SQL: &str = r#"CREATE TABLE public.user_profiles (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  user_id UUID NOT NULL UNIQUE,
  first_name TEXT NOT NULL,
  last_name TEXT NOT NULL,
  age INTEGER,
  height NUMERIC(5,2),
  weight NUMERIC(5,2),
  created_at TIMESTAMPTZ DEFAULT NOW(),
  updated_at TIMESTAMPTZ DEFAULT NOW()
);

ALTER TABLE public.user_profiles ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Users can view own profile"
  ON public.user_profiles FOR SELECT
  USING (auth.uid() = user_id);

CREATE POLICY "Users can insert own profile"
  ON public.user_profiles FOR INSERT
  WITH CHECK (auth.uid() = user_id);

CREATE POLICY "Users can update own profile"
  ON public.user_profiles FOR UPDATE
  USING (auth.uid() = user_id);"#;

/// What the resolver found for an identity.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    /// One row exists.
    Found(Profile),
    /// No row yet — expected absence, no banner.
    Missing,
    /// The table itself does not exist — deployment-time misconfiguration,
    /// surfaced as the remediation banner.
    SchemaMissing,
}

/// Fetch the profile row for an identity and classify the outcome.
///
/// Unexpected failures are logged and rendered as absence so they never block
/// the page.
pub async fn resolve_profile(
    client: &BackendClient,
    access_token: &str,
    identity: &Identity,
) -> ProfileLookup {
    match client.fetch_profile(access_token, identity.id).await {
        Ok(Some(profile)) => ProfileLookup::Found(profile),
        Ok(None) => ProfileLookup::Missing,
        Err(err) if BackendFault::of(&err) == BackendFault::SchemaMissing => {
            ProfileLookup::SchemaMissing
        }
        Err(err) => {
            tracing::error!(user_id = %identity.id, error = %err, "profile fetch failed");
            ProfileLookup::Missing
        }
    }
}

/// Display name for the dashboard greeting: the profile's first name, or the
/// email local part when no row exists.
pub fn greeting_name(lookup: &ProfileLookup, identity: &Identity) -> String {
    match lookup {
        ProfileLookup::Found(profile) => profile.first_name.clone(),
        _ => identity.email_local_part().to_string(),
    }
}

//! Two-step onboarding form.
//!
//! `Name → Measurements → submit`, with a skip-to-end shortcut from the name
//! step. All fields arrive as strings from the browser; parsing to typed
//! values happens once, when the record is built.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::ProfileRecord;

/// The steps of the onboarding form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Name,
    Measurements,
}

impl OnboardingStep {
    /// The following step, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        match self {
            Self::Name => Some(Self::Measurements),
            Self::Measurements => None,
        }
    }

    /// The preceding step, if any.
    pub fn back(&self) -> Option<OnboardingStep> {
        match self {
            Self::Name => None,
            Self::Measurements => Some(Self::Name),
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Name
    }
}

/// Raw form values as posted by the browser.
///
/// Values survive step changes because every post carries the full set; back
/// navigation re-renders the earlier step from the same data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
}

/// User-facing validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in your first and last name.")]
    MissingName,

    #[error("{field} must be a number.")]
    InvalidNumber { field: &'static str },
}

impl OnboardingForm {
    /// Required-name check gating both the step transition and the submit.
    pub fn validate_names(&self) -> Result<(), FormError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        Ok(())
    }

    /// Advance from the name step. Blocked until both names are non-empty
    /// after trimming.
    pub fn advance(&self) -> Result<OnboardingStep, FormError> {
        self.validate_names()?;
        Ok(OnboardingStep::Measurements)
    }

    /// Build the upsert payload. Empty numeric fields are absent, never zero;
    /// a non-empty field that does not parse is a validation error.
    pub fn to_record(
        &self,
        user_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> Result<ProfileRecord, FormError> {
        self.validate_names()?;
        Ok(ProfileRecord {
            user_id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            age: parse_optional(&self.age, "Age")?,
            height: parse_optional(&self.height, "Height")?,
            weight: parse_optional(&self.weight, "Weight")?,
            updated_at: submitted_at,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    raw: &str,
    field: &'static str,
) -> Result<Option<T>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| FormError::InvalidNumber { field })
}

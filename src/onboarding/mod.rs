//! Onboarding — the two-step profile form and its writer.
//!
//! Step one collects the required name, step two the optional measurements;
//! both the finish and the skip-to-end shortcut upsert the same record.

pub mod form;
pub mod writer;

pub use form::{FormError, OnboardingForm, OnboardingStep};
pub use writer::{SaveOutcome, save_profile};

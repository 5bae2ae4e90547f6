//! Onboarding form pages and submission handling.

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::onboarding::{OnboardingForm, OnboardingStep, SaveOutcome, save_profile};
use crate::session::{self, Bootstrap};

use super::pages::{config_required_page, escape_html, layout, schema_banner, unreachable_page};
use super::{AppState, session_token};

/// What to surface above the form, if anything.
enum Notice {
    Validation(String),
    Retry,
    SchemaMissing,
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <input id=\"{name}\" name=\"{name}\" type=\"text\" value=\"{}\">\n",
        escape_html(value)
    )
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        "<input name=\"{name}\" type=\"hidden\" value=\"{}\">\n",
        escape_html(value)
    )
}

/// Render one step of the form. Every post carries all five fields, so both
/// directions of navigation preserve what the user already typed.
fn form_page(step: OnboardingStep, form: &OnboardingForm, notice: Option<Notice>) -> Html<String> {
    let mut body = String::from("<h1>Welcome to Lookia!</h1>\n<p>Let's set up your fashion profile.</p>\n");

    match notice {
        Some(Notice::Validation(message)) => {
            body.push_str(&format!("<p class=\"notice\">{}</p>\n", escape_html(&message)));
        }
        Some(Notice::Retry) => {
            body.push_str("<p class=\"notice\">Could not save your profile. Please try again.</p>\n");
        }
        Some(Notice::SchemaMissing) => {
            body.push_str(&schema_banner());
            body.push('\n');
        }
        None => {}
    }

    body.push_str("<form method=\"post\" action=\"/onboarding\">\n");

    match step {
        OnboardingStep::Name => {
            body.push_str("<h2>First, your name</h2>\n");
            body.push_str(&text_input("first_name", "First name", &form.first_name));
            body.push_str(&text_input("last_name", "Last name", &form.last_name));
            body.push_str(&hidden_input("age", &form.age));
            body.push_str(&hidden_input("height", &form.height));
            body.push_str(&hidden_input("weight", &form.weight));
            body.push_str(
                "<button name=\"action\" value=\"next\">Next</button>\n\
                 <button name=\"action\" value=\"skip\">Skip to the end</button>\n",
            );
        }
        OnboardingStep::Measurements => {
            body.push_str("<h2>Optional details</h2>\n\
                 <p>These help personalize your recommendations.</p>\n");
            body.push_str(&hidden_input("first_name", &form.first_name));
            body.push_str(&hidden_input("last_name", &form.last_name));
            body.push_str(&text_input("age", "Age", &form.age));
            body.push_str(&text_input("height", "Height (cm)", &form.height));
            body.push_str(&text_input("weight", "Weight (kg)", &form.weight));
            body.push_str(
                "<button name=\"action\" value=\"back\">Back</button>\n\
                 <button name=\"action\" value=\"finish\">Finish</button>\n",
            );
        }
    }

    body.push_str("</form>");

    layout("Onboarding", &body)
}

/// `GET /onboarding` — protected; starts at the name step.
pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = session_token(&headers);
    match session::resolve_session(&state.backend, token.as_deref()).await {
        Bootstrap::Unavailable => config_required_page().into_response(),
        Bootstrap::TimedOut => unreachable_page().into_response(),
        Bootstrap::SignedOut => Redirect::to("/auth").into_response(),
        Bootstrap::Ready(_) => {
            form_page(OnboardingStep::Name, &OnboardingForm::default(), None).into_response()
        }
    }
}

/// Which button the user pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Next,
    Back,
    Finish,
    Skip,
}

impl Action {
    /// The step the user was on when the post was made — where "remain on
    /// the current step" lands after a failed save.
    fn current_step(self) -> OnboardingStep {
        match self {
            Self::Next | Self::Skip => OnboardingStep::Name,
            Self::Back | Self::Finish => OnboardingStep::Measurements,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OnboardingPost {
    pub action: Action,
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

impl OnboardingPost {
    fn form(&self) -> OnboardingForm {
        OnboardingForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age.clone(),
            height: self.height.clone(),
            weight: self.weight.clone(),
        }
    }
}

/// `POST /onboarding` — step transitions and the final upsert.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(post): Form<OnboardingPost>,
) -> Response {
    let token = session_token(&headers);
    let identity = match session::resolve_session(&state.backend, token.as_deref()).await {
        Bootstrap::Unavailable => return config_required_page().into_response(),
        Bootstrap::TimedOut => return unreachable_page().into_response(),
        Bootstrap::SignedOut => return Redirect::to("/auth").into_response(),
        Bootstrap::Ready(identity) => identity,
    };

    let form = post.form();

    match post.action {
        Action::Next => match form.advance() {
            Ok(step) => form_page(step, &form, None).into_response(),
            Err(err) => form_page(
                OnboardingStep::Name,
                &form,
                Some(Notice::Validation(err.to_string())),
            )
            .into_response(),
        },

        Action::Back => form_page(OnboardingStep::Name, &form, None).into_response(),

        Action::Finish | Action::Skip => {
            let (Some(client), Some(token)) = (state.backend.client(), token.as_deref()) else {
                return config_required_page().into_response();
            };

            let record = match form.to_record(identity.id, Utc::now()) {
                Ok(record) => record,
                Err(err) => {
                    return form_page(
                        post.action.current_step(),
                        &form,
                        Some(Notice::Validation(err.to_string())),
                    )
                    .into_response();
                }
            };

            match save_profile(client, token, &record).await {
                SaveOutcome::Saved => Redirect::to("/dashboard").into_response(),
                SaveOutcome::SchemaMissing => {
                    form_page(post.action.current_step(), &form, Some(Notice::SchemaMissing))
                        .into_response()
                }
                SaveOutcome::Failed => {
                    form_page(post.action.current_step(), &form, Some(Notice::Retry))
                        .into_response()
                }
            }
        }
    }
}

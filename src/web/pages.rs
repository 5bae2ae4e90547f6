//! Server-rendered pages: home, sign-in, dashboard, and the feature
//! placeholders. Markup is deliberately plain; the meaningful behavior is in
//! the bootstrap and resolver calls.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::profile::{self, PROFILE_SCHEMA_SQL, ProfileLookup};
use crate::session::{self, Bootstrap};

use super::{AppState, session_token};

/// Escape text interpolated into markup.
pub(crate) fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} — Lookia</title>\n</head>\n<body>\n{body}\n</body>\n</html>"
    ))
}

/// Remediation block shown when the profile table is missing. Both the
/// dashboard resolver and the onboarding writer render exactly this text.
pub(crate) fn schema_banner() -> String {
    format!(
        "<section class=\"config-banner\">\n\
         <h3>Configuration required</h3>\n\
         <p>The profile table has not been created in the backing store yet. \
         Run this statement in the service's SQL editor:</p>\n\
         <pre>{PROFILE_SCHEMA_SQL}</pre>\n\
         </section>"
    )
}

/// Page shown whenever the backend handle is withheld. No network call is
/// made on this path.
pub(crate) fn config_required_page() -> Html<String> {
    layout(
        "Configuration required",
        "<section class=\"config-banner\">\n\
         <h1>Configuration required</h1>\n\
         <p>Set <code>LOOKIA_BACKEND_URL</code> and <code>LOOKIA_BACKEND_KEY</code> \
         to your hosted backend's endpoint URL and public API key, then restart \
         the server.</p>\n\
         </section>",
    )
}

/// Page shown when the identity probe exceeded its budget — the backend is
/// configured but unreachable, which is not the same misconfiguration.
pub(crate) fn unreachable_page() -> Html<String> {
    layout(
        "Backend unreachable",
        "<section class=\"config-banner\">\n\
         <h1>Backend unreachable</h1>\n\
         <p>The backend did not answer within the allowed time. \
         Check the service status and reload the page.</p>\n\
         </section>",
    )
}

// ── Public pages ────────────────────────────────────────────────────────

pub async fn home() -> Html<String> {
    layout(
        "Welcome",
        "<h1>Lookia</h1>\n\
         <p>Create amazing looks with your personal fashion AI. Register your \
         clothes, generate look images and share them with the community.</p>\n\
         <p><a href=\"/auth\">Get started</a></p>",
    )
}

#[derive(Debug, Deserialize)]
pub struct SignInParams {
    pub error: Option<String>,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Query(params): Query<SignInParams>,
) -> Html<String> {
    let mut body = String::from("<h1>Sign in to Lookia</h1>\n");

    if !state.backend.is_configured() {
        body.push_str(
            "<p class=\"notice\">The backend is not configured; \
             sign-in is unavailable.</p>\n",
        );
    }

    if let Some(error) = &params.error {
        let notice = match error.as_str() {
            "auth_callback_error" => "Sign-in failed. Please try again.",
            "missing_env_vars" => "The backend is not configured on this server.",
            _ => "Something went wrong. Please try again.",
        };
        body.push_str(&format!("<p class=\"notice\">{notice}</p>\n"));
    }

    body.push_str(
        "<p>Create your account or sign in with your provider to get going.</p>\n\
         <script>\n\
         async function waitForSession() {\n\
           const resp = await fetch('/auth/wait?next=/dashboard');\n\
           if (resp.status === 200) {\n\
             const body = await resp.json();\n\
             window.location.assign(body.redirect);\n\
           } else {\n\
             waitForSession();\n\
           }\n\
         }\n\
         waitForSession();\n\
         </script>",
    );

    layout("Sign in", &body)
}

// ── Dashboard ───────────────────────────────────────────────────────────

const FEATURE_CARDS: &[(&str, &str, &str)] = &[
    ("My Items", "Register and manage your clothes and accessories", "/items"),
    ("Create Looks", "Generate amazing looks with AI", "/looks"),
    ("Agenda", "Plan your events and looks", "/events"),
    ("Community", "Share and browse looks from others", "/community"),
    ("Declutter", "Sell the items you no longer wear", "/sell"),
    ("Partners", "Explore partner stores", "/partners"),
];

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = session_token(&headers);

    match session::resolve_session(&state.backend, token.as_deref()).await {
        Bootstrap::Unavailable => config_required_page().into_response(),
        Bootstrap::TimedOut => unreachable_page().into_response(),
        Bootstrap::SignedOut => Redirect::to("/auth").into_response(),
        Bootstrap::Ready(identity) => {
            // Ready implies a configured backend and a present token.
            let (Some(client), Some(token)) = (state.backend.client(), token.as_deref()) else {
                return config_required_page().into_response();
            };

            let lookup = profile::resolve_profile(client, token, &identity).await;
            let greeting = escape_html(&profile::greeting_name(&lookup, &identity));

            let mut body = format!(
                "<header>\n<h1>Dashboard</h1>\n<p>Hello, {greeting}!</p>\n\
                 <form method=\"post\" action=\"/logout\">\
                 <button type=\"submit\">Sign out</button></form>\n</header>\n"
            );

            if lookup == ProfileLookup::SchemaMissing {
                // Misconfiguration blocks the data-dependent portion only.
                body.push_str(&schema_banner());
                return layout("Dashboard", &body).into_response();
            }

            body.push_str("<main>\n");
            for (title, description, href) in FEATURE_CARDS {
                body.push_str(&format!(
                    "<section class=\"card\">\n<h2>{title}</h2>\n\
                     <p>{description}</p>\n<a href=\"{href}\">Open</a>\n</section>\n"
                ));
            }
            body.push_str("</main>");

            layout("Dashboard", &body).into_response()
        }
    }
}

// ── Feature placeholders ────────────────────────────────────────────────

fn placeholder(title: &str) -> Html<String> {
    layout(
        title,
        &format!(
            "<h1>{title}</h1>\n<p>This area is under construction.</p>\n\
             <p><a href=\"/dashboard\">Back to the dashboard</a></p>"
        ),
    )
}

pub async fn items() -> Html<String> {
    placeholder("My Items")
}

pub async fn looks() -> Html<String> {
    placeholder("Create Looks")
}

pub async fn events() -> Html<String> {
    placeholder("Agenda")
}

pub async fn community() -> Html<String> {
    placeholder("Community")
}

pub async fn sell() -> Html<String> {
    placeholder("Declutter")
}

pub async fn partners() -> Html<String> {
    placeholder("Partners")
}

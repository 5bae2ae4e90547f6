//! Sign-in callback, session wait, and logout.

use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::backend::AuthListener;

use super::{AppState, clear_session_cookie, session_cookie, session_token};

/// How long one `/auth/wait` request holds its subscription before asking the
/// client to poll again.
const WAIT_BUDGET: Duration = Duration::from_secs(25);

/// Only local absolute paths are valid redirect targets; everything else
/// falls back to the dashboard.
fn sanitize_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/dashboard",
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// `GET /auth/callback?code&next` — exchange the authorization code for a
/// session, persist it in the cookie, and redirect to `next`.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(client) = state.backend.client() else {
        tracing::error!("auth callback hit while the backend is not configured");
        return Redirect::to("/auth?error=missing_env_vars").into_response();
    };

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        tracing::warn!("auth callback without a code parameter");
        return Redirect::to("/auth?error=auth_callback_error").into_response();
    };

    match client.exchange_code(code).await {
        Ok(session) => {
            let next = sanitize_next(params.next.as_deref());
            tracing::info!(user_id = %session.user.id, next, "code exchange succeeded");
            let cookie = session_cookie(&session.access_token);
            state.events.signed_in(session);
            (
                AppendHeaders([(header::SET_COOKIE, cookie)]),
                Redirect::to(next),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "code exchange failed");
            Redirect::to("/auth?error=auth_callback_error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    pub next: Option<String>,
}

/// `GET /auth/wait?next` — long-poll used by the sign-in page.
///
/// Holds an auth-state subscription for at most [`WAIT_BUDGET`]; answers with
/// the redirect target when a session appears, or 204 so the client re-polls.
/// The subscription is released when this handler returns, whichever way the
/// request ends.
pub async fn wait_for_session(
    State(state): State<AppState>,
    Query(params): Query<WaitParams>,
) -> Response {
    let target = sanitize_next(params.next.as_deref()).to_string();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _listener = AuthListener::spawn(&state.events, target, tx);

    match tokio::time::timeout(WAIT_BUDGET, rx.recv()).await {
        Ok(Some(redirect)) => Json(serde_json::json!({ "redirect": redirect })).into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `POST /logout` — invalidate the session upstream, clear the cookie, and
/// go home. Upstream failure is logged only; the local session ends anyway.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let (Some(client), Some(token)) = (state.backend.client(), session_token(&headers)) {
        if let Err(err) = client.sign_out(&token).await {
            tracing::warn!(error = %err, "upstream sign-out failed");
        }
    }
    state.events.signed_out();
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Redirect::to("/"),
    )
        .into_response()
}

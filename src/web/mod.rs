//! HTTP surface — routers, shared state, and the session cookie.

pub mod auth;
pub mod onboarding;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::backend::{AuthEvents, Backend};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub events: Arc<AuthEvents>,
}

/// Cookie carrying the access token between page loads.
pub const SESSION_COOKIE: &str = "lookia_session";

/// Build the full application router.
pub fn app_routes(backend: Backend, events: Arc<AuthEvents>) -> Router {
    let state = AppState { backend, events };

    Router::new()
        .route("/", get(pages::home))
        .route("/auth", get(pages::sign_in))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/wait", get(auth::wait_for_session))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/onboarding", get(onboarding::show).post(onboarding::submit))
        .route("/items", get(pages::items))
        .route("/looks", get(pages::looks))
        .route("/events", get(pages::events))
        .route("/community", get(pages::community))
        .route("/sell", get(pages::sell))
        .route("/partners", get(pages::partners))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Read the access token from the request's cookies, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Cookie value persisting a session.
pub fn session_cookie(access_token: &str) -> String {
    format!("{SESSION_COOKIE}={access_token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Cookie value clearing the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

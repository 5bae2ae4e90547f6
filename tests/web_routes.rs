//! Route-level tests driving the real router with in-process requests.
//!
//! The hosted service is played by wiremock; requests go through
//! `tower::ServiceExt::oneshot`, so redirects, cookies, and rendered pages
//! are asserted exactly as a browser would see them.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lookia::backend::{AuthEvents, Backend, Identity, Session};
use lookia::config::BackendSettings;
use lookia::profile::PROFILE_SCHEMA_SQL;
use lookia::web::app_routes;

const USER_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn configured(server: &MockServer) -> Backend {
    Backend::from_config(Some(&BackendSettings {
        url: server.uri(),
        anon_key: SecretString::from("anon-key"),
    }))
}

fn app(backend: Backend) -> Router {
    app_routes(backend, Arc::new(AuthEvents::new()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_session(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, "lookia_session=jwt-token")
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, form: &str, with_session: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if with_session {
        builder = builder.header(header::COOKIE, "lookia_session=jwt-token");
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Mount the get-user mock so protected pages resolve a session.
async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "ana.silva@example.com"
        })))
        .mount(server)
        .await;
}

// ── Auth callback ───────────────────────────────────────────────────────

#[tokio::test]
async fn callback_without_code_redirects_to_error() {
    let server = MockServer::start().await;
    let resp = app(configured(&server))
        .oneshot(get("/auth/callback"))
        .await
        .unwrap();

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/auth?error=auth_callback_error");
}

#[tokio::test]
async fn callback_without_configuration_redirects_to_missing_env() {
    let resp = app(Backend::Unavailable)
        .oneshot(get("/auth/callback?code=abc"))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/auth?error=missing_env_vars");
}

#[tokio::test]
async fn callback_with_valid_code_sets_cookie_and_follows_next() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "user": { "id": USER_ID, "email": "ana.silva@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get("/auth/callback?code=abc&next=/onboarding"))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/onboarding");
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("callback should persist the session")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("lookia_session=jwt-token"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn callback_with_rejected_code_redirects_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get("/auth/callback?code=stale"))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/auth?error=auth_callback_error");
}

#[tokio::test]
async fn callback_rejects_offsite_next_targets() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "user": { "id": USER_ID, "email": "ana.silva@example.com" }
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get("/auth/callback?code=abc&next=https://evil.test"))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/dashboard");
}

// ── Configuration-required degradation ──────────────────────────────────

#[tokio::test]
async fn unconfigured_dashboard_renders_config_view() {
    let resp = app(Backend::Unavailable).oneshot(get("/dashboard")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("LOOKIA_BACKEND_URL"));
    assert!(body.contains("Configuration required"));
}

#[tokio::test]
async fn unconfigured_onboarding_renders_config_view() {
    let resp = app(Backend::Unavailable).oneshot(get("/onboarding")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Configuration required"));
}

#[tokio::test]
async fn unconfigured_sign_in_page_warns() {
    let resp = app(Backend::Unavailable).oneshot(get("/auth")).await.unwrap();
    assert!(body_text(resp).await.contains("not configured"));
}

// ── Dashboard ───────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_without_cookie_redirects_to_sign_in() {
    let server = MockServer::start().await;
    let resp = app(configured(&server)).oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(location(&resp), "/auth");
}

#[tokio::test]
async fn dashboard_greeting_falls_back_to_email_local_part() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "message": "no rows"
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get_with_session("/dashboard"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Hello, ana.silva!"));
    assert!(!body.contains("config-banner"), "absence is not an error");
}

#[tokio::test]
async fn dashboard_greeting_uses_profile_first_name() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": USER_ID,
            "first_name": "Ana",
            "last_name": "Silva"
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get_with_session("/dashboard"))
        .await
        .unwrap();

    let body = body_text(resp).await;
    assert!(body.contains("Hello, Ana!"));
    assert!(body.contains("/looks"), "feature cards render");
}

#[tokio::test]
async fn dashboard_unexpected_profile_error_does_not_block_rendering() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(get_with_session("/dashboard"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Hello, ana.silva!"));
}

// ── Schema-missing banner parity ────────────────────────────────────────

#[tokio::test]
async fn resolver_and_writer_show_identical_remediation_sql() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    let table_missing = ResponseTemplate::new(404).set_body_json(json!({
        "code": "PGRST205",
        "message": "Could not find the table 'public.user_profiles' in the schema cache"
    }));

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(table_missing.clone())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(table_missing)
        .mount(&server)
        .await;

    let backend = configured(&server);

    let dashboard = app(backend.clone())
        .oneshot(get_with_session("/dashboard"))
        .await
        .unwrap();
    let dashboard_body = body_text(dashboard).await;
    assert!(dashboard_body.contains(PROFILE_SCHEMA_SQL));

    let onboarding = app(backend)
        .oneshot(post_form(
            "/onboarding",
            "action=finish&first_name=Ana&last_name=Silva&age=&height=&weight=",
            true,
        ))
        .await
        .unwrap();
    let onboarding_body = body_text(onboarding).await;
    assert!(onboarding_body.contains(PROFILE_SCHEMA_SQL));
}

// ── Onboarding flow ─────────────────────────────────────────────────────

#[tokio::test]
async fn onboarding_next_is_blocked_without_names() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=next&first_name=&last_name=&age=&height=&weight=",
            true,
        ))
        .await
        .unwrap();

    let body = body_text(resp).await;
    assert!(body.contains("Please fill in your first and last name."));
    assert!(body.contains("First, your name"), "stays on the name step");
}

#[tokio::test]
async fn onboarding_next_advances_with_names() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=next&first_name=Ana&last_name=Silva&age=&height=&weight=",
            true,
        ))
        .await
        .unwrap();

    let body = body_text(resp).await;
    assert!(body.contains("Optional details"));
    assert!(body.contains("value=\"Ana\""), "names carried into step two");
}

#[tokio::test]
async fn onboarding_back_preserves_entered_values() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=back&first_name=Ana&last_name=Silva&age=25&height=&weight=",
            true,
        ))
        .await
        .unwrap();

    let body = body_text(resp).await;
    assert!(body.contains("First, your name"));
    assert!(body.contains("value=\"Ana\""));
    assert!(body.contains("value=\"25\""), "measurements kept while on step one");
}

#[tokio::test]
async fn onboarding_finish_saves_and_redirects_to_dashboard() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/user_profiles"))
        .and(query_param("on_conflict", "user_id"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=finish&first_name=Ana&last_name=Silva&age=25&height=165.5&weight=58.5",
            true,
        ))
        .await
        .unwrap();

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn onboarding_skip_upserts_names_only() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=skip&first_name=Ana&last_name=Silva&age=&height=&weight=",
            true,
        ))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn onboarding_generic_save_failure_keeps_the_step() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=finish&first_name=Ana&last_name=Silva&age=&height=&weight=",
            true,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Could not save your profile. Please try again."));
    assert!(body.contains("Optional details"), "remains on step two");
}

#[tokio::test]
async fn onboarding_without_session_redirects_to_sign_in() {
    let server = MockServer::start().await;
    let resp = app(configured(&server))
        .oneshot(post_form(
            "/onboarding",
            "action=next&first_name=Ana&last_name=Silva",
            false,
        ))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/auth");
}

// ── Auth wait + logout ──────────────────────────────────────────────────

#[tokio::test]
async fn wait_answers_when_a_session_appears() {
    let server = MockServer::start().await;
    let events = Arc::new(AuthEvents::new());
    let app = app_routes(configured(&server), Arc::clone(&events));

    let publisher = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        events.signed_in(Session {
            access_token: "jwt-token".to_string(),
            refresh_token: None,
            user: Identity {
                id: USER_ID.parse().unwrap(),
                email: "ana.silva@example.com".to_string(),
            },
        });
    });

    let resp = app.oneshot(get("/auth/wait?next=/dashboard")).await.unwrap();
    publisher.await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("\"redirect\":\"/dashboard\""));
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app(configured(&server))
        .oneshot(post_form("/logout", "", true))
        .await
        .unwrap();

    assert_eq!(location(&resp), "/");
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

// ── Placeholders ────────────────────────────────────────────────────────

#[tokio::test]
async fn feature_placeholders_render() {
    for route in ["/items", "/looks", "/events", "/community", "/sell", "/partners"] {
        let resp = app(Backend::Unavailable).oneshot(get(route)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{route}");
        assert!(body_text(resp).await.contains("under construction"), "{route}");
    }
}

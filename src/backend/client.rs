//! HTTP client for the hosted auth/data service.
//!
//! Two surfaces are consumed: the auth endpoints (`auth/v1/*`) and the
//! auto-generated table REST interface (`rest/v1/*`). Failures are mapped
//! into [`BackendError`] at each call site; no retries beyond what reqwest
//! does internally.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::config::BackendSettings;
use crate::error::BackendError;

use super::fault::{BackendFault, ErrorPayload};
use super::types::{Identity, Profile, ProfileRecord, Session};

/// Table holding one profile row per identity.
const PROFILE_TABLE: &str = "user_profiles";

/// Handle to the backend: configured, or withheld when the URL/key pair is
/// missing. Carried in server state so every consumer handles both cases.
#[derive(Clone)]
pub enum Backend {
    Configured(Arc<BackendClient>),
    Unavailable,
}

impl Backend {
    /// Construct the handle from optional settings.
    ///
    /// Missing settings yield [`Backend::Unavailable`] with a diagnostic
    /// warning; downstream pages degrade to a configuration-required view.
    pub fn from_config(settings: Option<&BackendSettings>) -> Self {
        match settings {
            Some(settings) => Self::Configured(Arc::new(BackendClient::new(
                settings.url.clone(),
                settings.anon_key.clone(),
            ))),
            None => {
                tracing::warn!(
                    "LOOKIA_BACKEND_URL / LOOKIA_BACKEND_KEY not set; \
                     serving configuration-required pages only"
                );
                Self::Unavailable
            }
        }
    }

    /// The configured client, if any.
    pub fn client(&self) -> Option<&Arc<BackendClient>> {
        match self {
            Self::Configured(client) => Some(client),
            Self::Unavailable => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

/// The configured client for the hosted service.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl BackendClient {
    pub fn new(base_url: String, anon_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Start a request with the service headers applied.
    ///
    /// The anon key goes in `apikey` on every call; `Authorization` carries
    /// the user's access token for user-scoped calls, falling back to the
    /// anon key otherwise.
    fn request(&self, method: Method, url: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = match access_token {
            Some(token) => token.to_string(),
            None => self.anon_key.expose_secret().to_string(),
        };
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .header("x-application-name", "lookia")
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    // ── Auth endpoints ──────────────────────────────────────────────────

    /// Exchange a sign-in authorization code for a session.
    pub async fn exchange_code(&self, code: &str) -> Result<Session, BackendError> {
        let url = self.auth_url("token?grant_type=authorization_code");
        let resp = self
            .request(Method::POST, &url, None)
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await
            .map_err(|e| transport("auth/v1/token", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::AuthRejected {
                reason: format!("code exchange failed ({status}): {body}"),
            });
        }

        resp.json::<Session>()
            .await
            .map_err(|e| invalid_response("auth/v1/token", e))
    }

    /// Fetch the identity behind an access token.
    pub async fn current_user(&self, access_token: &str) -> Result<Identity, BackendError> {
        let url = self.auth_url("user");
        let resp = self
            .request(Method::GET, &url, Some(access_token))
            .send()
            .await
            .map_err(|e| transport("auth/v1/user", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(BackendError::AuthRejected {
                reason: format!("get-user failed ({status})"),
            });
        }

        resp.json::<Identity>()
            .await
            .map_err(|e| invalid_response("auth/v1/user", e))
    }

    /// Invalidate the session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.auth_url("logout");
        let resp = self
            .request(Method::POST, &url, Some(access_token))
            .send()
            .await
            .map_err(|e| transport("auth/v1/logout", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(BackendError::AuthRejected {
                reason: format!("sign-out failed ({status})"),
            });
        }
        Ok(())
    }

    // ── Profile table ───────────────────────────────────────────────────

    /// Select the single profile row for an identity.
    ///
    /// A row-not-found response is expected absence and returns `Ok(None)`.
    pub async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Option<Profile>, BackendError> {
        let url = self.table_url(PROFILE_TABLE);
        let key_filter = format!("eq.{user_id}");
        let resp = self
            .request(Method::GET, &url, Some(access_token))
            .query(&[("select", "*"), ("user_id", key_filter.as_str())])
            // Singular response: exactly one row or a row-not-found code.
            .header(ACCEPT, "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| transport(PROFILE_TABLE, e))?;

        if resp.status().is_success() {
            return resp
                .json::<Profile>()
                .await
                .map(Some)
                .map_err(|e| invalid_response(PROFILE_TABLE, e));
        }

        let err = service_error(PROFILE_TABLE, resp).await;
        match BackendFault::of(&err) {
            BackendFault::RowNotFound => Ok(None),
            _ => Err(err),
        }
    }

    /// Insert-or-update the profile row keyed by `user_id`.
    ///
    /// Merge-duplicates on the unique key makes re-submission overwrite the
    /// existing row rather than create a second one.
    pub async fn upsert_profile(
        &self,
        access_token: &str,
        record: &ProfileRecord,
    ) -> Result<(), BackendError> {
        let url = self.table_url(PROFILE_TABLE);
        let resp = self
            .request(Method::POST, &url, Some(access_token))
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| transport(PROFILE_TABLE, e))?;

        if resp.status().is_success() {
            return Ok(());
        }
        Err(service_error(PROFILE_TABLE, resp).await)
    }
}

fn transport(endpoint: &str, err: reqwest::Error) -> BackendError {
    BackendError::Transport {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

fn invalid_response(endpoint: &str, err: reqwest::Error) -> BackendError {
    BackendError::InvalidResponse {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

/// Decode a table REST error payload, keeping the service's code for
/// classification. An undecodable body degrades to a code-less service error.
async fn service_error(endpoint: &str, resp: Response) -> BackendError {
    let status: StatusCode = resp.status();
    match resp.json::<ErrorPayload>().await {
        Ok(payload) => BackendError::Service {
            code: payload.code,
            message: payload
                .message
                .unwrap_or_else(|| format!("{endpoint} request failed ({status})")),
        },
        Err(_) => BackendError::Service {
            code: None,
            message: format!("{endpoint} request failed ({status})"),
        },
    }
}

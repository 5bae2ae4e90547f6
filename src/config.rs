//! Configuration loaded from environment variables.
//!
//! The backend URL/key pair is optional by design: the server starts without
//! it and serves a configuration-required view instead of failing.

use secrecy::SecretString;

/// Connection settings for the hosted auth/data backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Service endpoint URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: SecretString,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend settings, `None` when either env var is missing.
    pub backend: Option<BackendSettings>,
    /// HTTP listen port.
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from `LOOKIA_*` environment variables.
    ///
    /// A missing backend URL or key is a supported degraded state, not a
    /// startup failure.
    pub fn from_env() -> Self {
        Self::assemble(
            std::env::var("LOOKIA_BACKEND_URL").ok(),
            std::env::var("LOOKIA_BACKEND_KEY").ok(),
            std::env::var("LOOKIA_HTTP_PORT").ok(),
        )
    }

    fn assemble(url: Option<String>, anon_key: Option<String>, port: Option<String>) -> Self {
        let url = url.filter(|v| !v.is_empty());
        let anon_key = anon_key.filter(|v| !v.is_empty());

        let backend = match (url, anon_key) {
            (Some(url), Some(key)) => Some(BackendSettings {
                url: url.trim_end_matches('/').to_string(),
                anon_key: SecretString::from(key),
            }),
            _ => None,
        };

        let port: u16 = port
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        Self { backend, port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn both_values_present_yields_backend() {
        let config = AppConfig::assemble(s("https://example.test/"), s("anon-key"), None);
        let backend = config.backend.expect("backend should be configured");
        assert_eq!(backend.url, "https://example.test");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn missing_url_yields_no_backend() {
        let config = AppConfig::assemble(None, s("anon-key"), None);
        assert!(config.backend.is_none());
    }

    #[test]
    fn missing_key_yields_no_backend() {
        let config = AppConfig::assemble(s("https://example.test"), None, None);
        assert!(config.backend.is_none());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let config = AppConfig::assemble(s(""), s(""), None);
        assert!(config.backend.is_none());
    }

    #[test]
    fn port_parses_with_fallback() {
        let config = AppConfig::assemble(None, None, s("8080"));
        assert_eq!(config.port, 8080);

        let config = AppConfig::assemble(None, None, s("not-a-port"));
        assert_eq!(config.port, 3000);
    }
}

//! Error types for Lookia.

/// Top-level error type for the server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the hosted auth/data backend.
///
/// Every request the client issues maps its failure into one of these at the
/// call site; nothing escapes to a global handler.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Auth request rejected: {reason}")]
    AuthRejected { reason: String },

    #[error("Service error{}: {message}", code_suffix(.code))]
    Service {
        /// Error code from the service payload, when one was present.
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(c) => format!(" {c}"),
        None => String::new(),
    }
}

/// Result type alias for the server.
pub type Result<T> = std::result::Result<T, Error>;

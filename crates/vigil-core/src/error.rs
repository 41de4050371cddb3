// ── Core error types ──
//
// Errors surfaced to console consumers. HTTP details from `vigil_api` are
// folded into the handful of outcomes the console reacts to: the session
// is gone, the role is not allowed, or the backend is unreachable.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// No valid session: the backend answered 401 or nobody is logged in.
    /// The stored session has already been cleared when this is returned.
    #[error("Not logged in (session missing or expired)")]
    Unauthenticated,

    /// The logged-in role may not perform this action (HTTP 403).
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session storage error: {message}")]
    Storage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Failures that the next poll tick may not see again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vigil_api::Error> for CoreError {
    fn from(err: vigil_api::Error) -> Self {
        match err {
            vigil_api::Error::Authentication { .. } => CoreError::InvalidCredentials,
            vigil_api::Error::Unauthorized { .. } => CoreError::Unauthenticated,
            vigil_api::Error::Forbidden { message } => CoreError::Forbidden { message },
            vigil_api::Error::NotFound { path } => {
                let (entity_type, identifier) = split_resource_path(&path);
                CoreError::NotFound {
                    entity_type,
                    identifier,
                }
            }
            vigil_api::Error::Conflict { message } => CoreError::Conflict { message },
            vigil_api::Error::BadRequest { message } => CoreError::Validation { message },
            vigil_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            vigil_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            vigil_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            vigil_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot carry API paths: {url}"),
            },
            vigil_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            vigil_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
                status: None,
            },
        }
    }
}

/// `/api/locations/abc` becomes `("locations", "abc")`.
fn split_resource_path(path: &str) -> (String, String) {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let last = segments.next().unwrap_or_default();
    match segments.next() {
        Some(kind) if !kind.is_empty() => (kind.to_owned(), last.to_owned()),
        _ => ("resource".to_owned(), last.to_owned()),
    }
}

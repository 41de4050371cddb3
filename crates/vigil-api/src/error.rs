use thiserror::Error;

/// Top-level error type for the `vigil-api` crate.
///
/// Covers every failure mode of the backend REST surface: login rejection,
/// HTTP status classes the console reacts to, transport and decoding.
/// `vigil-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong username or password).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// HTTP 401 on a regular request: the session is missing or expired.
    #[error("Not authenticated: {message}")]
    Unauthorized { message: String },

    /// HTTP 403: authenticated, but the role may not perform this request.
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    // ── Resource status ─────────────────────────────────────────────
    /// HTTP 404 for the requested path.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// HTTP 409 (duplicate name on create or import).
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// HTTP 400: the backend rejected the payload.
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {0}")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for HTTP 401: the stored session must be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` for HTTP 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status this error was derived from, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::BadRequest { .. } => Some(400),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        let unauthorized = Error::Unauthorized {
            message: "expired".into(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_forbidden());
        assert_eq!(unauthorized.status(), Some(401));

        let forbidden = Error::Forbidden {
            message: "admin only".into(),
        };
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());

        let err = Error::Api {
            status: 418,
            message: "teapot".into(),
        };
        assert!(!err.is_transient());
    }
}

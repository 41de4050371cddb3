//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vigil_config::ConfigError;
use vigil_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the backend at {url}")]
    #[diagnostic(
        code(vigil::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in to profile '{profile}'")]
    #[diagnostic(code(vigil::not_logged_in), help("Run: vigil login"))]
    NotLoggedIn { profile: String },

    #[error("Session expired or was rejected by the backend")]
    #[diagnostic(
        code(vigil::session_expired),
        help("The stored session has been cleared. Run: vigil login")
    )]
    SessionExpired,

    #[error("Invalid username or password")]
    #[diagnostic(
        code(vigil::auth_failed),
        help("Check the credentials for profile '{profile}'.\nStore a password with: vigil config set-password")
    )]
    AuthFailed { profile: String },

    #[error("No username configured for profile '{profile}'")]
    #[diagnostic(
        code(vigil::no_credentials),
        help(
            "Pass one: vigil login <USERNAME>\n\
             Or set it in the profile with: vigil config init"
        )
    )]
    NoUsername { profile: String },

    // ── Authorization ────────────────────────────────────────────────
    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(vigil::permission_denied),
        help("This command needs the admin role. Log in as an administrator.")
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vigil::not_found),
        help("Run: vigil {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Conflict: {message}")]
    #[diagnostic(
        code(vigil::conflict),
        help("A resource with the same name already exists.")
    )]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(vigil::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vigil::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vigil::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vigil config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(vigil::no_config),
        help(
            "Create a profile with: vigil config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(vigil::config))]
    Config(#[from] ConfigError),

    #[error("Session storage failed: {message}")]
    #[diagnostic(code(vigil::session_storage))]
    Storage { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(vigil::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(vigil::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(vigil::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(vigil::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotLoggedIn { .. }
            | Self::SessionExpired
            | Self::AuthFailed { .. }
            | Self::NoUsername { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// Display label and list command for a backend resource kind, which may
/// arrive singular ("location") or as a path segment ("locations").
fn resource_label(entity_type: &str) -> (&'static str, &'static str) {
    match entity_type {
        "location" | "locations" => ("location", "locations list"),
        "client" | "clients" => ("client", "clients list"),
        "user" | "users" => ("user", "users list"),
        "urlProfiles" | "url profile" | "url_profile" => ("URL profile", "url-profiles list"),
        _ => ("resource", "links"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated => CliError::SessionExpired,

            CoreError::Forbidden { message } => CliError::PermissionDenied { message },

            CoreError::InvalidCredentials => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                let (resource_type, list_command) = resource_label(&entity_type);
                CliError::NotFound {
                    resource_type: resource_type.into(),
                    identifier,
                    list_command: list_command.into(),
                }
            }

            CoreError::Conflict { message } => CliError::Conflict { message },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Storage { message } => CliError::Storage { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

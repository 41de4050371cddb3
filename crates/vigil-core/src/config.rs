// ── Runtime console configuration ──
//
// Describes *where* the backend lives and how often views refresh.
// The CLI builds a `ConsoleConfig` from its profile and hands it in;
// core never reads config files.

use std::time::Duration;

use url::Url;

use crate::liveness::DEFAULT_ONLINE_THRESHOLD;

/// Default refresh cadence of the admin list views.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default refresh cadence of the home link board.
pub const DEFAULT_HOME_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed backends).
    DangerAcceptInvalid,
}

/// Configuration for talking to one monitoring backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API base URL (e.g., `https://vpn.example.net/api`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Refresh cadence for the admin list views.
    pub poll_interval: Duration,
    /// Refresh cadence for the home link board.
    pub home_poll_interval: Duration,
    /// Maximum age of a handshake for a device to count as online.
    pub online_threshold: Duration,
}

impl ConsoleConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            home_poll_interval: DEFAULT_HOME_POLL_INTERVAL,
            online_threshold: DEFAULT_ONLINE_THRESHOLD,
        }
    }
}

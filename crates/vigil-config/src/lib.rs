//! Shared configuration for vigil front ends.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! translation to `vigil_core::ConsoleConfig`, and on-disk session
//! storage so a login survives between CLI invocations.

mod session_store;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vigil_core::{ConsoleConfig, TlsVerification};

pub use session_store::FileSessionStorage;

const KEYRING_SERVICE: &str = "vigil";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://vpn.example.net/api").
    pub api_url: String,

    /// Username used by `vigil login` when none is given.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// List refresh cadence in milliseconds.
    pub poll_interval_ms: Option<u64>,

    /// Home board refresh cadence in milliseconds.
    pub home_poll_interval_ms: Option<u64>,

    /// Handshake age (minutes) still counted as online.
    pub online_threshold_mins: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "vigil", "vigil")
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("vigil");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, file and `VIGIL_*` environment.
///
/// Nested keys use a double underscore: `VIGIL_DEFAULTS__TIMEOUT=10`.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("VIGIL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Username from the profile, then `VIGIL_USERNAME`.
pub fn resolve_username(profile: &Profile) -> Option<String> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("VIGIL_USERNAME").ok())
        .filter(|u| !u.is_empty())
}

/// Resolve the login password: the profile's `password_env`, then
/// `VIGIL_PASSWORD`, then the system keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var("VIGIL_PASSWORD") {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: "not set (run `vigil config init` or pass --api-url)".into(),
        });
    }
    raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

fn millis_or(value: Option<u64>, fallback: Duration) -> Duration {
    value.map_or(fallback, Duration::from_millis)
}

/// Build a `ConsoleConfig` from a profile. No flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;
    let mut config = ConsoleConfig::new(url);

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = millis_or(profile.poll_interval_ms, config.poll_interval);
    config.home_poll_interval = millis_or(profile.home_poll_interval_ms, config.home_poll_interval);
    if let Some(mins) = profile.online_threshold_mins {
        config.online_threshold = Duration::from_secs(mins.saturating_mul(60));
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_profile_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_profile = "office"

            [profiles.office]
            api_url = "https://vpn.example.net/api"
            username = "root"
            password_env = "OFFICE_PW"
            poll_interval_ms = 2000
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("office"));
        assert_eq!(cfg.defaults.output, "table");
        let office = &cfg.profiles["office"];
        assert_eq!(office.username.as_deref(), Some("root"));
        assert_eq!(office.poll_interval_ms, Some(2000));
    }

    #[test]
    fn console_config_from_profile() {
        let profile = Profile {
            api_url: "https://vpn.example.net/api".into(),
            insecure: Some(true),
            poll_interval_ms: Some(2500),
            online_threshold_mins: Some(10),
            ..Profile::default()
        };
        let cfg = profile_to_console_config(&profile, &Defaults::default()).unwrap();

        assert_eq!(cfg.url.as_str(), "https://vpn.example.net/api");
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.poll_interval, Duration::from_millis(2500));
        assert_eq!(cfg.home_poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.online_threshold, Duration::from_secs(600));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let profile = Profile {
            api_url: "https://vpn.example.net/api".into(),
            ca_cert: Some("/etc/vigil/ca.pem".into()),
            ..Profile::default()
        };
        let cfg = profile_to_console_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/vigil/ca.pem".into()));
    }

    #[test]
    fn missing_or_bad_url_is_rejected() {
        let err = profile_to_console_config(&Profile::default(), &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        assert!(profile_to_console_config(&profile, &Defaults::default()).is_err());
    }
}

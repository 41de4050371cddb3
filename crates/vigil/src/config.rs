//! CLI configuration: thin wrapper around `vigil_config` shared types.
//!
//! Adds the resolution step that applies `GlobalOpts` flag overrides
//! (--api-url, --insecure, --timeout) on top of the active profile.

use std::sync::Arc;

use vigil_config::FileSessionStorage;
use vigil_core::{Console, ConsoleConfig, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vigil_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with flag overrides applied.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub console_config: ConsoleConfig,
}

/// Pick the active profile and layer CLI flags over it.
///
/// With no matching profile, `--api-url` alone is enough to build one.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.api_url.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let console_config = vigil_config::profile_to_console_config(&profile, &cfg.defaults)?;
    Ok(Resolved {
        profile_name,
        profile,
        console_config,
    })
}

/// Open the profile's persisted session and build a console over it.
pub fn open_console(resolved: &Resolved) -> Result<Console, CliError> {
    let storage = FileSessionStorage::for_profile(&resolved.profile_name);
    tracing::debug!(path = %storage.path().display(), "session file");
    let session = Arc::new(Session::open(Arc::new(storage))?);
    Ok(Console::new(resolved.console_config.clone(), session)?)
}

//! Shared helpers for command handlers.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read a secret from the first line of stdin.
pub fn read_secret_stdin() -> Result<SecretString, CliError> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(secret))
}

/// Prompt for a secret without echo.
pub fn prompt_secret(prompt: &str) -> Result<SecretString, CliError> {
    Ok(SecretString::from(rpassword::prompt_password(prompt)?))
}

/// Prompt twice for a new password; both entries must match.
pub fn prompt_new_password() -> Result<SecretString, CliError> {
    let first = prompt_secret("New password: ")?;
    let second = prompt_secret("Confirm password: ")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(first)
}

/// A new password from stdin or an interactive double prompt.
pub fn new_password(from_stdin: bool) -> Result<SecretString, CliError> {
    if from_stdin {
        read_secret_stdin()
    } else {
        prompt_new_password()
    }
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Write a download to `out`, to `default_name` when no path was given,
/// or to stdout for "-". Returns where it went.
pub fn save_download(
    bytes: &[u8],
    out: Option<PathBuf>,
    default_name: &str,
) -> Result<String, CliError> {
    let path = out.unwrap_or_else(|| PathBuf::from(file_safe(default_name)));
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok("stdout".into());
    }
    std::fs::write(&path, bytes)?;
    Ok(path.display().to_string())
}

/// Replace path separators and other awkward characters in a file name.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_download_names_are_file_safe() {
        assert_eq!(file_safe("HQ / floor 2.conf"), "HQ___floor_2.conf");
        assert_eq!(file_safe("router-qrcode.png"), "router-qrcode.png");
    }

    #[test]
    fn save_download_writes_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hq.conf");
        let shown = save_download(b"[Interface]", Some(path.clone()), "ignored").unwrap();
        assert_eq!(shown, path.display().to_string());
        assert_eq!(std::fs::read(&path).unwrap(), b"[Interface]");
    }

    #[test]
    fn read_json_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_json_file::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "got {err:?}");
    }
}

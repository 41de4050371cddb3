// ── Typed mutation requests ──
//
// Inputs to the console's create/update operations. Each request checks
// itself before anything is sent to the backend.

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;
use crate::model::{Role, UrlProfile};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 4..=20;
const MIN_PASSWORD_LEN: usize = 8;

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::Validation {
        message: message.into(),
    }
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

fn check_username(username: &str) -> Result<(), CoreError> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !USERNAME_LEN.contains(&username.len()) || !valid_chars {
        return Err(invalid(
            "username must be 4-20 characters (letters, numbers, underscores only)",
        ));
    }
    Ok(())
}

fn check_password(password: &SecretString) -> Result<(), CoreError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub role: Role,
    pub password: SecretString,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_username(&self.username)?;
        require("role", self.role.as_str())?;
        check_password(&self.password)
    }
}

/// Replaces username and role; the password only changes when given.
#[derive(Debug, Clone)]
pub struct UpdateUserRequest {
    pub username: String,
    pub role: Role,
    pub password: Option<SecretString>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_username(&self.username)?;
        require("role", self.role.as_str())?;
        self.password.as_ref().map_or(Ok(()), check_password)
    }
}

// ── Locations ──────────────────────────────────────────────────────

/// Full location body; used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    pub name: String,
    pub url_profile: String,
    pub is_enabled: bool,
}

impl LocationRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("URL profile", &self.url_profile)
    }
}

// ── Clients ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    pub name: String,
}

impl ClientRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)
    }
}

// ── URL profiles ───────────────────────────────────────────────────

pub(crate) fn validate_url_profile(profile: &UrlProfile) -> Result<(), CoreError> {
    require("profile name", &profile.name)?;
    for url in &profile.urls {
        require("link name", &url.name)?;
        require("link template", &url.template)?;
    }
    Ok(())
}

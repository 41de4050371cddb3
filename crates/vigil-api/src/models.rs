// Wire types for the backend REST API.
//
// Field names follow the backend's camelCase JSON. Every list endpoint
// returns a bare JSON array of these records.

use serde::{Deserialize, Serialize};

// ── Auth ────────────────────────────────────────────────────────────

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login payload: who logged in and with which role.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

// ── Users ───────────────────────────────────────────────────────────

/// The backend reports a user's role either as a single string or as a
/// list of strings depending on the endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleField {
    One(String),
    Many(Vec<String>),
}

impl RoleField {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(role) => vec![role],
            Self::Many(roles) => roles,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<RoleField>,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub role: String,
    pub password: String,
}

/// Body of `PUT /users/{id}`. An absent password leaves it unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    pub username: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ── Locations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub url_profile: Option<String>,
    #[serde(default)]
    pub latest_handshake_at: Option<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Body of `POST /locations` and `PUT /locations/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub name: String,
    pub url_profile: String,
    pub is_enabled: bool,
}

// ── Clients ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub latest_handshake_at: Option<String>,
}

/// Body of `POST /clients` and `PUT /clients/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientPayload {
    pub name: String,
}

// ── URL profiles ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UrlEntry {
    pub name: String,
    pub template: String,
}

/// A URL profile as read and written by `/urlProfiles`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UrlProfileRecord {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<UrlEntry>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_field_accepts_string_or_list() {
        let one: UserRecord =
            serde_json::from_value(json!({"id": "1", "username": "a", "role": "admin"})).unwrap();
        assert_eq!(one.role.unwrap().into_vec(), vec!["admin".to_owned()]);

        let many: UserRecord = serde_json::from_value(
            json!({"id": "2", "username": "b", "role": ["normal", "admin"]}),
        )
        .unwrap();
        assert_eq!(many.role.unwrap().into_vec().len(), 2);
    }

    #[test]
    fn location_without_handshake_decodes() {
        let loc: LocationRecord = serde_json::from_value(json!({
            "id": "loc-1",
            "name": "Branch office",
            "ipAddress": "10.8.0.2",
            "urlProfile": "router"
        }))
        .unwrap();
        assert!(loc.latest_handshake_at.is_none());
        assert!(loc.is_enabled);
        assert_eq!(loc.ip_address.as_deref(), Some("10.8.0.2"));
    }

    #[test]
    fn user_update_omits_empty_password() {
        let body = serde_json::to_value(UserUpdate {
            username: "ops".into(),
            role: "normal".into(),
            password: None,
        })
        .unwrap();
        assert!(body.get("password").is_none());
    }
}

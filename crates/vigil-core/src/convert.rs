// ── API-to-domain type conversions ──
//
// Bridges `vigil_api` wire records and `vigil_core` domain types in both
// directions: records into the model, requests into payloads.

use secrecy::ExposeSecret;

use vigil_api::{
    ClientPayload, ClientRecord, LocationPayload, LocationRecord, NewUser, UrlEntry,
    UrlProfileRecord, UserRecord, UserUpdate,
};

use crate::model::{Client, Location, Role, UrlProfile, UrlTemplate, User};
use crate::request::{ClientRequest, CreateUserRequest, LocationRequest, UpdateUserRequest};

/// Blank strings from the backend mean "not set".
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Records → model ────────────────────────────────────────────────

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            roles: r
                .role
                .map(|field| field.into_vec().into_iter().map(Role::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<LocationRecord> for Location {
    fn from(r: LocationRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            ip_address: non_empty(r.ip_address),
            url_profile: non_empty(r.url_profile),
            latest_handshake_at: non_empty(r.latest_handshake_at),
            is_enabled: r.is_enabled,
        }
    }
}

impl From<ClientRecord> for Client {
    fn from(r: ClientRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            ip_address: non_empty(r.ip_address),
            latest_handshake_at: non_empty(r.latest_handshake_at),
        }
    }
}

impl From<UrlProfileRecord> for UrlProfile {
    fn from(r: UrlProfileRecord) -> Self {
        Self {
            name: r.name,
            urls: r
                .urls
                .into_iter()
                .map(|u| UrlTemplate {
                    name: u.name,
                    template: u.template,
                })
                .collect(),
        }
    }
}

// ── Requests → payloads ────────────────────────────────────────────

impl From<&CreateUserRequest> for NewUser {
    fn from(req: &CreateUserRequest) -> Self {
        Self {
            username: req.username.clone(),
            role: req.role.as_str().to_owned(),
            password: req.password.expose_secret().to_owned(),
        }
    }
}

impl From<&UpdateUserRequest> for UserUpdate {
    fn from(req: &UpdateUserRequest) -> Self {
        Self {
            username: req.username.clone(),
            role: req.role.as_str().to_owned(),
            password: req.password.as_ref().map(|p| p.expose_secret().to_owned()),
        }
    }
}

impl From<&LocationRequest> for LocationPayload {
    fn from(req: &LocationRequest) -> Self {
        Self {
            name: req.name.trim().to_owned(),
            url_profile: req.url_profile.clone(),
            is_enabled: req.is_enabled,
        }
    }
}

impl From<&ClientRequest> for ClientPayload {
    fn from(req: &ClientRequest) -> Self {
        Self {
            name: req.name.trim().to_owned(),
        }
    }
}

impl From<&UrlProfile> for UrlProfileRecord {
    fn from(p: &UrlProfile) -> Self {
        Self {
            name: p.name.clone(),
            urls: p
                .urls
                .iter()
                .map(|u| UrlEntry {
                    name: u.name.clone(),
                    template: u.template.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_handshake_becomes_none() {
        let record: LocationRecord = serde_json::from_value(json!({
            "id": "loc-1",
            "name": "HQ",
            "ipAddress": "10.8.0.2",
            "urlProfile": "",
            "latestHandshakeAt": ""
        }))
        .unwrap();
        let loc = Location::from(record);
        assert!(loc.latest_handshake_at.is_none());
        assert!(loc.url_profile.is_none());
    }

    #[test]
    fn user_roles_from_list() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": "u-1",
            "username": "root",
            "role": ["admin", "normal"]
        }))
        .unwrap();
        let user = User::from(record);
        assert!(user.is_admin());
        assert_eq!(user.primary_role(), Some(&Role::admin()));
    }

    #[test]
    fn update_payload_keeps_optional_password() {
        let req = UpdateUserRequest {
            username: "ops_team".into(),
            role: Role::new("normal"),
            password: Some("changed-pass".to_owned().into()),
        };
        let payload = UserUpdate::from(&req);
        assert_eq!(payload.password.as_deref(), Some("changed-pass"));
    }
}

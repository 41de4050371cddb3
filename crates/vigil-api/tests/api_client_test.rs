#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigil_api::{
    ApiClient, Error, LocationPayload, NewUser, TransportConfig, UrlEntry, UrlProfileRecord,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_returns_role() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "s3cret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=abc123; Path=/; HttpOnly")
                .set_body_json(json!({"id": "u-1", "username": "admin", "role": "admin"})),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "s3cret".to_string().into();
    let user = client.login("admin", &secret).await.unwrap();

    assert_eq!(user.id, "u-1");
    assert_eq!(user.role, "admin");
    assert_eq!(client.cookie_header().as_deref(), Some("sid=abc123"));
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_restored_cookie_is_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client.restore_cookies("sid=restored");
    let clients = client.list_clients().await.unwrap();
    assert!(clients.is_empty());
}

// ── Status classification ───────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_and_forbidden_are_distinct() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "admin only"})),
        )
        .mount(&server)
        .await;

    let err = client.list_locations().await.unwrap_err();
    assert!(err.is_unauthorized(), "got {err:?}");

    let err = client.list_users().await.unwrap_err();
    assert!(err.is_forbidden(), "got {err:?}");
    assert!(err.to_string().contains("admin only"));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client.list_clients().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client.list_locations().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
}

// ── Resource tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_locations() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "loc-1",
                "name": "HQ",
                "ipAddress": "10.8.0.2",
                "urlProfile": "router",
                "latestHandshakeAt": "2025-03-01T10:00:00.000Z",
                "isEnabled": true
            },
            {
                "id": "loc-2",
                "name": "Warehouse",
                "ipAddress": "10.8.0.3",
                "urlProfile": "router",
                "isEnabled": false
            }
        ])))
        .mount(&server)
        .await;

    let locations = client.list_locations().await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].name, "HQ");
    assert!(locations[1].latest_handshake_at.is_none());
    assert!(!locations[1].is_enabled);
}

#[tokio::test]
async fn test_create_location_sends_camel_case() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/locations"))
        .and(body_json(
            json!({"name": "Lab", "urlProfile": "switch", "isEnabled": true}),
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_location(&LocationPayload {
            name: "Lab".into(),
            url_profile: "switch".into(),
            is_enabled: true,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_location_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/locations/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_location("gone").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_qrcode_returns_bytes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations/loc-1/qrcode"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        )
        .mount(&server)
        .await;

    let bytes = client.location_qrcode("loc-1").await.unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_create_user() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(
            json!({"username": "ops", "role": "normal", "password": "pw"}),
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_user(&NewUser {
            username: "ops".into(),
            role: "normal".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_url_profile_roundtrip_by_name() {
    let (server, client) = setup().await;

    let profile = UrlProfileRecord {
        name: "router".into(),
        urls: vec![UrlEntry {
            name: "web".into(),
            template: "http://{ip}/".into(),
        }],
    };

    Mock::given(method("GET"))
        .and(path("/api/urlProfiles/router"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&profile))
        .mount(&server)
        .await;

    let fetched = client.get_url_profile("router").await.unwrap();
    assert_eq!(fetched, profile);
}

#[tokio::test]
async fn test_import_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/urlProfiles/import"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = client
        .import_url_profiles("profiles.json", b"[]".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }), "got {err:?}");
}

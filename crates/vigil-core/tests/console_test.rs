#![allow(clippy::unwrap_used)]
// Console behaviour against a mocked backend: login redirect memory,
// the 401/403 policy, and request validation.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigil_core::{
    Console, ConsoleConfig, CoreError, CreateUserRequest, Credential, Decision, Role, Route,
    Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Console, Arc<Session>) {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let session = Arc::new(Session::in_memory());
    let console = Console::new(ConsoleConfig::new(url), Arc::clone(&session)).unwrap();
    (server, console, session)
}

fn admin() -> Credential {
    Credential {
        user_id: "u-1".into(),
        username: "root".into(),
        role: Role::admin(),
    }
}

fn secret(s: &str) -> SecretString {
    s.to_owned().into()
}

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=s3ss10n; Path=/; HttpOnly")
                .set_body_json(json!({"id": "u-7", "username": "root", "role": role})),
        )
        .mount(server)
        .await;
}

// ── Login / logout ──────────────────────────────────────────────────

#[tokio::test]
async fn login_continues_to_remembered_destination() {
    let (server, console, session) = setup().await;
    mount_login(&server, "admin").await;

    assert_eq!(console.navigate(Route::Clients), Decision::RedirectToLogin);

    let destination = console.login("root", &secret("hunter22")).await.unwrap();
    assert_eq!(destination, "/admin/clients");
    assert_eq!(session.role(), Some(Role::admin()));
    assert_eq!(session.cookie().as_deref(), Some("sid=s3ss10n"));
    assert_eq!(console.navigate(Route::Clients), Decision::Proceed);

    // The redirect slot was consumed.
    let destination = console.login("root", &secret("hunter22")).await.unwrap();
    assert_eq!(destination, "/");
}

#[tokio::test]
async fn normal_role_is_sent_home_from_admin_routes() {
    let (server, console, _session) = setup().await;
    mount_login(&server, "normal").await;

    console.login("viewer", &secret("hunter22")).await.unwrap();
    assert_eq!(console.navigate(Route::Users), Decision::RedirectToHome);
    assert_eq!(console.navigate(Route::Home), Decision::Proceed);
}

#[tokio::test]
async fn rejected_login_keeps_session_empty() {
    let (server, console, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = console.login("root", &secret("wrong")).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidCredentials), "got {err:?}");
    assert!(session.get().is_none());
}

#[tokio::test]
async fn blank_credentials_never_reach_backend() {
    let (server, console, _session) = setup().await;

    let err = console.login("  ", &secret("x")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    let err = console.login("root", &secret("")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn logout_clears_session_even_if_backend_fails() {
    let (server, console, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    console.logout().await.unwrap();
    assert!(session.get().is_none());
}

// ── Error policy ────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_clears_session() {
    let (server, console, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    session.set_cookie(Some("sid=old".into())).unwrap();

    let err = console.list_locations().await.unwrap_err();
    assert!(err.is_unauthenticated());
    assert!(session.get().is_none());
    assert!(session.cookie().is_none());
    assert_eq!(console.navigate(Route::Locations), Decision::RedirectToLogin);
}

#[tokio::test]
async fn forbidden_keeps_session() {
    let (server, console, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "admins only"})))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    let err = console.list_users().await.unwrap_err();
    assert!(err.is_forbidden(), "got {err:?}");
    assert_eq!(session.get(), Some(admin()));
}

#[tokio::test]
async fn watch_feed_stops_and_logs_out_on_401() {
    let (server, console, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    let mut feed = console.watch_clients(Duration::from_millis(50));

    let state = tokio::time::timeout(Duration::from_secs(5), feed.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(state.error.unwrap().is_unauthenticated());
    assert!(feed.is_cancelled());
    assert!(session.get().is_none());
}

// ── Home board ──────────────────────────────────────────────────────

async fn mount_locations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "loc-1", "name": "HQ", "ipAddress": "10.8.0.2", "urlProfile": "router"}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn board_without_profiles_still_lists_locations() {
    let (server, console, session) = setup().await;
    mount_locations(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/urlProfiles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    let rows = console.board().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].location.name, "HQ");
    assert!(rows[0].links.is_empty());
}

#[tokio::test]
async fn board_feed_keeps_last_profiles_when_they_fail() {
    let (server, console, session) = setup().await;
    mount_locations(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/urlProfiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "router", "urls": [{"name": "web", "template": "http://{ip}/"}]}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/urlProfiles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    let mut feed = console.watch_board(Duration::from_millis(50));

    for _ in 0..3 {
        let state = tokio::time::timeout(Duration::from_secs(5), feed.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(state.error.is_none());
        assert_eq!(state.items[0].links.len(), 1);
        assert_eq!(state.items[0].links[0].url, "http://10.8.0.2/");
    }
    assert!(!feed.is_cancelled());
}

#[tokio::test]
async fn list_feed_survives_forbidden_ticks() {
    let (server, console, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    session.set(admin()).unwrap();
    let mut feed = console.watch_clients(Duration::from_millis(50));

    for _ in 0..2 {
        let state = tokio::time::timeout(Duration::from_secs(5), feed.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(state.error.unwrap().is_forbidden());
    }
    assert!(!feed.is_cancelled());
    assert_eq!(session.get(), Some(admin()));
    assert!(server.received_requests().await.unwrap().len() >= 2);
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_user_is_rejected_locally() {
    let (server, console, session) = setup().await;
    session.set(admin()).unwrap();

    let err = console
        .create_user(&CreateUserRequest {
            username: "x".into(),
            role: Role::new("normal"),
            password: secret("longenough"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_location_by_name() {
    let (server, console, _session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "loc-1", "name": "HQ", "ipAddress": "10.8.0.2", "urlProfile": "router"},
            {"id": "loc-2", "name": "Lab", "ipAddress": "10.8.0.3", "urlProfile": "router"}
        ])))
        .mount(&server)
        .await;

    assert_eq!(console.get_location("Lab").await.unwrap().id, "loc-2");
    assert_eq!(console.get_location("loc-1").await.unwrap().name, "HQ");
    let err = console.get_location("nowhere").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

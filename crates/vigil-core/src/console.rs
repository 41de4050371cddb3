// ── Console facade ──
//
// Everything a console screen does goes through here: login and logout,
// CRUD for each entity, polled list feeds, and role-gated navigation.
// One error policy covers every backend call: a 401 clears the session,
// a 403 leaves it alone.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use vigil_api::transport::{TlsMode, TransportConfig};
use vigil_api::{ApiClient, ClientPayload, LocationPayload, NewUser, UrlProfileRecord, UserUpdate};

use crate::config::{ConsoleConfig, TlsVerification};
use crate::error::CoreError;
use crate::gate::{Decision, RoleGate};
use crate::links::{BoardRow, link_board};
use crate::model::{Client, Location, Role, UrlProfile, User};
use crate::poll::ListFeed;
use crate::request::{
    ClientRequest, CreateUserRequest, LocationRequest, UpdateUserRequest, validate_url_profile,
};
use crate::route::Route;
use crate::session::{Credential, Session};

/// Entry point for console consumers.
///
/// Cheaply cloneable; clones share the API client and the session.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    api: ApiClient,
    session: Arc<Session>,
    gate: RoleGate,
}

impl Console {
    /// Build a console for `config`, resuming the backend cookie held by
    /// `session` if there is one. Does no I/O.
    pub fn new(config: ConsoleConfig, session: Arc<Session>) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let api = ApiClient::new(config.url.clone(), &transport)?;
        if let Some(cookie) = session.cookie() {
            api.restore_cookies(&cookie);
        }
        let gate = RoleGate::new(Arc::clone(&session));
        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                api,
                session,
                gate,
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn gate(&self) -> &RoleGate {
        &self.inner.gate
    }

    /// The logged-in identity, if any.
    pub fn current_user(&self) -> Option<Credential> {
        self.inner.session.get()
    }

    /// Evaluate the role gate for `route`.
    pub fn navigate(&self, route: Route) -> Decision {
        self.inner.gate.check_route(route)
    }

    /// Apply the shared error policy to a backend result.
    fn settle<T>(&self, result: Result<T, vigil_api::Error>) -> Result<T, CoreError> {
        result.map_err(|err| {
            let err = CoreError::from(err);
            if err.is_unauthenticated() {
                info!("backend rejected session, logging out");
                self.inner.session.clear_or_warn();
            }
            err
        })
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in and return the path to continue to: the destination that
    /// triggered the login redirect, or home.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<String, CoreError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(CoreError::Validation {
                message: "username and password are required".into(),
            });
        }

        let user = self.inner.api.login(username, password).await?;
        let session = &self.inner.session;
        session.set(Credential {
            user_id: user.id,
            username: user.username,
            role: Role::from(user.role),
        })?;
        session.set_cookie(self.inner.api.cookie_header())?;

        let destination = session
            .take_redirect()?
            .unwrap_or_else(|| Route::Home.path().to_owned());
        info!(user = username, %destination, "logged in");
        Ok(destination)
    }

    /// End the session. A failed logout request is logged; the local
    /// session is cleared regardless.
    pub async fn logout(&self) -> Result<(), CoreError> {
        if let Err(e) = self.inner.api.logout().await {
            warn!(error = %e, "logout request failed");
        }
        self.inner.session.clear()?;
        info!("logged out");
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        let records = self.settle(self.inner.api.list_users().await)?;
        Ok(records.into_iter().map(User::from).collect())
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(self.inner.api.create_user(&NewUser::from(req)).await)
    }

    pub async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(self.inner.api.update_user(id, &UserUpdate::from(req)).await)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), CoreError> {
        self.settle(self.inner.api.delete_user(id).await)
    }

    // ── Locations ────────────────────────────────────────────────────

    pub async fn list_locations(&self) -> Result<Vec<Location>, CoreError> {
        let records = self.settle(self.inner.api.list_locations().await)?;
        Ok(records.into_iter().map(Location::from).collect())
    }

    /// Find one location by id or, failing that, by exact name.
    pub async fn get_location(&self, key: &str) -> Result<Location, CoreError> {
        let mut locations = self.list_locations().await?;
        let index = locations
            .iter()
            .position(|l| l.id == key)
            .or_else(|| locations.iter().position(|l| l.name == key))
            .ok_or_else(|| not_found("location", key))?;
        Ok(locations.swap_remove(index))
    }

    pub async fn create_location(&self, req: &LocationRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(self.inner.api.create_location(&LocationPayload::from(req)).await)
    }

    pub async fn update_location(&self, id: &str, req: &LocationRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(
            self.inner
                .api
                .update_location(id, &LocationPayload::from(req))
                .await,
        )
    }

    pub async fn delete_location(&self, id: &str) -> Result<(), CoreError> {
        self.settle(self.inner.api.delete_location(id).await)
    }

    /// PNG bytes of the location's QR code.
    pub async fn location_qrcode(&self, id: &str) -> Result<Vec<u8>, CoreError> {
        self.settle(self.inner.api.location_qrcode(id).await)
    }

    /// The location's configuration file, as served.
    pub async fn location_configuration(&self, id: &str) -> Result<Vec<u8>, CoreError> {
        self.settle(self.inner.api.location_configuration(id).await)
    }

    // ── Clients ──────────────────────────────────────────────────────

    pub async fn list_clients(&self) -> Result<Vec<Client>, CoreError> {
        let records = self.settle(self.inner.api.list_clients().await)?;
        Ok(records.into_iter().map(Client::from).collect())
    }

    /// Find one client by id or, failing that, by exact name.
    pub async fn get_client(&self, key: &str) -> Result<Client, CoreError> {
        let mut clients = self.list_clients().await?;
        let index = clients
            .iter()
            .position(|c| c.id == key)
            .or_else(|| clients.iter().position(|c| c.name == key))
            .ok_or_else(|| not_found("client", key))?;
        Ok(clients.swap_remove(index))
    }

    pub async fn create_client(&self, req: &ClientRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(self.inner.api.create_client(&ClientPayload::from(req)).await)
    }

    pub async fn update_client(&self, id: &str, req: &ClientRequest) -> Result<(), CoreError> {
        req.validate()?;
        self.settle(
            self.inner
                .api
                .update_client(id, &ClientPayload::from(req))
                .await,
        )
    }

    pub async fn delete_client(&self, id: &str) -> Result<(), CoreError> {
        self.settle(self.inner.api.delete_client(id).await)
    }

    pub async fn client_qrcode(&self, id: &str) -> Result<Vec<u8>, CoreError> {
        self.settle(self.inner.api.client_qrcode(id).await)
    }

    pub async fn client_configuration(&self, id: &str) -> Result<Vec<u8>, CoreError> {
        self.settle(self.inner.api.client_configuration(id).await)
    }

    // ── URL profiles ─────────────────────────────────────────────────

    pub async fn list_url_profiles(&self) -> Result<Vec<UrlProfile>, CoreError> {
        let records = self.settle(self.inner.api.list_url_profiles().await)?;
        Ok(records.into_iter().map(UrlProfile::from).collect())
    }

    pub async fn get_url_profile(&self, name: &str) -> Result<UrlProfile, CoreError> {
        let record = self.settle(self.inner.api.get_url_profile(name).await)?;
        Ok(record.into())
    }

    pub async fn create_url_profile(&self, profile: &UrlProfile) -> Result<(), CoreError> {
        validate_url_profile(profile)?;
        self.settle(
            self.inner
                .api
                .create_url_profile(&UrlProfileRecord::from(profile))
                .await,
        )
    }

    /// Replace the profile stored under `name` (which may rename it).
    pub async fn update_url_profile(&self, name: &str, profile: &UrlProfile) -> Result<(), CoreError> {
        validate_url_profile(profile)?;
        self.settle(
            self.inner
                .api
                .update_url_profile(name, &UrlProfileRecord::from(profile))
                .await,
        )
    }

    pub async fn delete_url_profile(&self, name: &str) -> Result<(), CoreError> {
        self.settle(self.inner.api.delete_url_profile(name).await)
    }

    /// Upload a profile export. A 409 means a profile in the file already
    /// exists.
    pub async fn import_url_profiles(&self, file_name: &str, contents: Vec<u8>) -> Result<(), CoreError> {
        if contents.is_empty() {
            return Err(CoreError::Validation {
                message: format!("{file_name} is empty"),
            });
        }
        self.settle(self.inner.api.import_url_profiles(file_name, contents).await)
    }

    pub async fn export_url_profiles(&self) -> Result<Vec<u8>, CoreError> {
        self.settle(self.inner.api.export_url_profiles().await)
    }

    // ── Home board ───────────────────────────────────────────────────

    /// Board rows for the given snapshot, judged against the wall clock.
    pub fn link_board(&self, locations: &[Location], profiles: &[UrlProfile]) -> Vec<BoardRow> {
        link_board(
            locations,
            profiles,
            Utc::now(),
            self.inner.config.online_threshold,
        )
    }

    /// Fetch locations and profiles together and build the board.
    ///
    /// A failed profile fetch still yields a board: locations keep their
    /// liveness and show no links. Only the location fetch, or a 401 on
    /// either, fails the call.
    pub async fn board(&self) -> Result<Vec<BoardRow>, CoreError> {
        self.board_with(&ProfileCache::default()).await
    }

    async fn board_with(&self, cache: &ProfileCache) -> Result<Vec<BoardRow>, CoreError> {
        let (locations, profiles) = tokio::join!(self.list_locations(), self.list_url_profiles());
        let locations = locations?;
        let profiles = match profiles {
            Ok(profiles) => cache.replace(profiles),
            Err(e) if e.is_unauthenticated() => return Err(e),
            Err(e) => {
                warn!(error = %e, "url profiles unavailable, keeping last known set");
                cache.last()
            }
        };
        Ok(self.link_board(&locations, &profiles))
    }

    // ── Polled feeds ─────────────────────────────────────────────────

    pub fn watch_users(&self, interval: Duration) -> ListFeed<User> {
        let console = self.clone();
        ListFeed::spawn(
            move || {
                let console = console.clone();
                async move { console.list_users().await }
            },
            interval,
        )
    }

    pub fn watch_locations(&self, interval: Duration) -> ListFeed<Location> {
        let console = self.clone();
        ListFeed::spawn(
            move || {
                let console = console.clone();
                async move { console.list_locations().await }
            },
            interval,
        )
    }

    pub fn watch_clients(&self, interval: Duration) -> ListFeed<Client> {
        let console = self.clone();
        ListFeed::spawn(
            move || {
                let console = console.clone();
                async move { console.list_clients().await }
            },
            interval,
        )
    }

    pub fn watch_url_profiles(&self, interval: Duration) -> ListFeed<UrlProfile> {
        let console = self.clone();
        ListFeed::spawn(
            move || {
                let console = console.clone();
                async move { console.list_url_profiles().await }
            },
            interval,
        )
    }

    /// Poll the home board. Profiles from the last successful fetch are
    /// reused on ticks where only the profile request fails.
    pub fn watch_board(&self, interval: Duration) -> ListFeed<BoardRow> {
        let console = self.clone();
        let cache = Arc::new(ProfileCache::default());
        ListFeed::spawn(
            move || {
                let console = console.clone();
                let cache = Arc::clone(&cache);
                async move { console.board_with(&cache).await }
            },
            interval,
        )
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("url", &self.inner.config.url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

/// Last URL profile list seen by a board poller.
#[derive(Default)]
struct ProfileCache(Mutex<Arc<Vec<UrlProfile>>>);

impl ProfileCache {
    fn replace(&self, profiles: Vec<UrlProfile>) -> Arc<Vec<UrlProfile>> {
        let profiles = Arc::new(profiles);
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&profiles);
        profiles
    }

    fn last(&self) -> Arc<Vec<UrlProfile>> {
        Arc::clone(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn not_found(entity_type: &str, identifier: &str) -> CoreError {
    CoreError::NotFound {
        entity_type: entity_type.to_owned(),
        identifier: identifier.to_owned(),
    }
}

fn build_transport(config: &ConsoleConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    debug!(url = %config.url, ?tls, "building transport");
    TransportConfig {
        tls,
        timeout: config.timeout,
        cookie_jar: None,
    }
    .with_cookie_jar()
}

// ── Session service ──
//
// Holds who is logged in. Every navigation reads it, login writes it,
// logout and any 401 wipe it. State lives in memory and is written
// through to a `SessionStorage` so the CLI can resume across runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::Role;

/// The logged-in identity. A role being present means "logged in".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

/// Everything the session persists, slot by slot. All slots are cleared
/// together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Destination requested before a login redirect. Single slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_after_login: Option<String>,
    /// Backend session cookie (`name=value` pairs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

impl SessionSlots {
    /// The credential, if the role slot is populated.
    pub fn credential(&self) -> Option<Credential> {
        let role = self.role.clone()?;
        Some(Credential {
            user_id: self.user_id.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            role,
        })
    }
}

/// Backing store for [`SessionSlots`].
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<SessionSlots, CoreError>;
    fn store(&self, slots: &SessionSlots) -> Result<(), CoreError>;
}

/// Process-local storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slots: Mutex<SessionSlots>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<SessionSlots, CoreError> {
        Ok(self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, slots: &SessionSlots) -> Result<(), CoreError> {
        *self.slots.lock().unwrap_or_else(PoisonError::into_inner) = slots.clone();
        Ok(())
    }
}

/// Shared session service. Last writer wins.
///
/// In-memory state is authoritative for the running process: a failed
/// write-through is returned to the caller but the change still applies.
pub struct Session {
    slots: Mutex<SessionSlots>,
    storage: Arc<dyn SessionStorage>,
    changes: watch::Sender<Option<Credential>>,
}

impl Session {
    /// Open a session backed by `storage`, resuming whatever it holds.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Result<Self, CoreError> {
        let slots = storage.load()?;
        let (changes, _) = watch::channel(slots.credential());
        debug!(logged_in = slots.role.is_some(), "session opened");
        Ok(Self {
            slots: Mutex::new(slots),
            storage,
            changes,
        })
    }

    pub fn in_memory() -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            slots: Mutex::new(SessionSlots::default()),
            storage: Arc::new(MemorySessionStorage::default()),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `edit` to the slots, persist, and notify subscribers.
    fn update(&self, edit: impl FnOnce(&mut SessionSlots)) -> Result<(), CoreError> {
        let mut slots = self.lock();
        edit(&mut slots);
        let credential = slots.credential();
        let persisted = self.storage.store(&slots);
        drop(slots);

        self.changes.send_if_modified(|current| {
            if *current == credential {
                false
            } else {
                *current = credential;
                true
            }
        });
        persisted
    }

    // ── Credential ───────────────────────────────────────────────────

    pub fn get(&self) -> Option<Credential> {
        self.lock().credential()
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().role.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().role.is_some()
    }

    /// Store the credential. The redirect slot is left as is.
    pub fn set(&self, credential: Credential) -> Result<(), CoreError> {
        self.update(|slots| {
            slots.username = Some(credential.username);
            slots.role = Some(credential.role);
            slots.user_id = Some(credential.user_id);
        })
    }

    /// Wipe every slot, redirect and cookie included.
    pub fn clear(&self) -> Result<(), CoreError> {
        debug!("clearing session");
        self.update(|slots| *slots = SessionSlots::default())
    }

    /// Clear, logging instead of returning a storage failure.
    pub(crate) fn clear_or_warn(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "failed to persist cleared session");
        }
    }

    /// Watch credential changes (login, logout, expiry).
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.changes.subscribe()
    }

    // ── Redirect memory ──────────────────────────────────────────────

    /// Remember where to go after login, replacing any earlier path.
    pub fn remember_redirect(&self, path: &str) -> Result<(), CoreError> {
        let path = path.to_owned();
        self.update(|slots| slots.redirect_after_login = Some(path))
    }

    pub fn redirect(&self) -> Option<String> {
        self.lock().redirect_after_login.clone()
    }

    /// Take the remembered path, emptying the slot.
    pub fn take_redirect(&self) -> Result<Option<String>, CoreError> {
        let mut taken = None;
        self.update(|slots| taken = slots.redirect_after_login.take())?;
        Ok(taken)
    }

    // ── Backend cookie ───────────────────────────────────────────────

    pub fn cookie(&self) -> Option<String> {
        self.lock().cookie.clone()
    }

    pub fn set_cookie(&self, cookie: Option<String>) -> Result<(), CoreError> {
        self.update(|slots| slots.cookie = cookie)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

// ── Role gate ──
//
// Decides whether the current session may enter a destination. Trusts
// the stored role; the backend still enforces its own 401/403.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, warn};

use crate::model::Role;
use crate::route::Route;
use crate::session::Session;

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    Proceed,
    RedirectToLogin,
    RedirectToHome,
}

/// Pure authorization rule.
///
/// No role: log in first. An empty allow-list admits any role; otherwise
/// the role must be listed.
pub fn authorize(current_role: Option<&Role>, allowed: &BTreeSet<Role>) -> Decision {
    match current_role {
        None => Decision::RedirectToLogin,
        Some(role) if allowed.is_empty() || allowed.contains(role) => Decision::Proceed,
        Some(_) => Decision::RedirectToHome,
    }
}

/// [`authorize`] bound to a session, with redirect memory.
#[derive(Debug, Clone)]
pub struct RoleGate {
    session: Arc<Session>,
}

impl RoleGate {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Check entry to `requested_path`. On `RedirectToLogin` the path is
    /// remembered so login can continue there.
    pub fn check(&self, requested_path: &str, allowed: &BTreeSet<Role>) -> Decision {
        let role = self.session.role();
        let decision = authorize(role.as_ref(), allowed);
        debug!(path = requested_path, %decision, "role gate");

        if decision == Decision::RedirectToLogin {
            if let Err(e) = self.session.remember_redirect(requested_path) {
                warn!(error = %e, "failed to persist login redirect");
            }
        }
        decision
    }

    /// Check entry to a known route. Public routes always proceed.
    pub fn check_route(&self, route: Route) -> Decision {
        if route.is_public() {
            return Decision::Proceed;
        }
        self.check(route.path(), &route.allowed_roles())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::Credential;

    fn admin_only() -> BTreeSet<Role> {
        BTreeSet::from([Role::admin()])
    }

    #[test]
    fn no_role_redirects_to_login() {
        assert_eq!(authorize(None, &admin_only()), Decision::RedirectToLogin);
        assert_eq!(authorize(None, &BTreeSet::new()), Decision::RedirectToLogin);
    }

    #[test]
    fn wrong_role_redirects_home() {
        let normal = Role::new("normal");
        assert_eq!(authorize(Some(&normal), &admin_only()), Decision::RedirectToHome);
    }

    #[test]
    fn empty_allow_list_admits_any_role() {
        let normal = Role::new("normal");
        assert_eq!(authorize(Some(&normal), &BTreeSet::new()), Decision::Proceed);
        assert_eq!(authorize(Some(&Role::admin()), &admin_only()), Decision::Proceed);
    }

    #[test]
    fn gate_remembers_requested_path() {
        let session = Arc::new(Session::in_memory());
        let gate = RoleGate::new(Arc::clone(&session));

        let decision = gate.check("/admin/locations", &admin_only());
        assert_eq!(decision, Decision::RedirectToLogin);
        assert_eq!(session.redirect().as_deref(), Some("/admin/locations"));
    }

    #[test]
    fn gate_leaves_redirect_alone_when_logged_in() {
        let session = Arc::new(Session::in_memory());
        session
            .set(Credential {
                user_id: "u-2".into(),
                username: "viewer".into(),
                role: Role::new("normal"),
            })
            .unwrap();
        let gate = RoleGate::new(Arc::clone(&session));

        assert_eq!(gate.check_route(Route::Users), Decision::RedirectToHome);
        assert_eq!(gate.check_route(Route::Home), Decision::Proceed);
        assert!(session.redirect().is_none());
    }

    #[test]
    fn login_route_is_always_open() {
        let gate = RoleGate::new(Arc::new(Session::in_memory()));
        assert_eq!(gate.check_route(Route::Login), Decision::Proceed);
    }
}

// ── Console destinations ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::model::Role;

/// Every place the console can navigate to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    Home,
    Users,
    Locations,
    UrlProfiles,
    Clients,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
            Self::Users => "/admin/users",
            Self::Locations => "/admin/locations",
            Self::UrlProfiles => "/admin/urlProfiles",
            Self::Clients => "/admin/clients",
        }
    }

    /// Resolve a path; `/admin` lands on the user list.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Self::Home);
        }
        if trimmed == "/admin" {
            return Some(Self::Users);
        }
        Self::iter().find(|route| route.path() == trimmed)
    }

    /// Reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login)
    }

    /// Roles allowed in. Empty means any logged-in role.
    pub fn allowed_roles(self) -> BTreeSet<Role> {
        match self {
            Self::Login | Self::Home => BTreeSet::new(),
            Self::Users | Self::Locations | Self::UrlProfiles | Self::Clients => {
                BTreeSet::from([Role::admin()])
            }
        }
    }
}

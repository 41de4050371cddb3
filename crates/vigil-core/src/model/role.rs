// ── Authorization role ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// An authorization tier as reported by the backend (`admin`, `normal`, ...).
///
/// Opaque beyond equality: the console only ever asks "is this role in
/// the allow-list?".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const NORMAL: &'static str = "normal";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self(name)
    }
}

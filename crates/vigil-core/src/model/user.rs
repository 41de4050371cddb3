// ── User accounts ──

use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Every role the backend lists for this account, in backend order.
    pub roles: Vec<Role>,
}

impl User {
    /// The role shown in listings: the first one the backend reported.
    pub fn primary_role(&self) -> Option<&Role> {
        self.roles.first()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}

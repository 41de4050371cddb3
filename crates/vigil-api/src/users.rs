// User account endpoints
//
// Admin-only on the backend: a non-admin session gets HTTP 403.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{NewUser, UserRecord, UserUpdate};

impl ApiClient {
    /// List all user accounts.
    ///
    /// `GET /users`
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        let url = self.endpoint(&["users"])?;
        self.get_json(url).await
    }

    /// Create a user account.
    ///
    /// `POST /users` with `{"username", "role", "password"}`
    pub async fn create_user(&self, user: &NewUser) -> Result<(), Error> {
        let url = self.endpoint(&["users"])?;
        debug!(username = %user.username, role = %user.role, "creating user");
        self.post(url, user).await
    }

    /// Update a user account. The password is only sent when set.
    ///
    /// `PUT /users/{id}`
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), Error> {
        let url = self.endpoint(&["users", id])?;
        debug!(id, "updating user");
        self.put(url, update).await
    }

    /// Delete a user account.
    ///
    /// `DELETE /users/{id}`
    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["users", id])?;
        debug!(id, "deleting user");
        self.delete(url).await
    }
}

// Session authentication
//
// Cookie-based login/logout. The login endpoint sets an HTTP-only session
// cookie in the client's jar; subsequent requests carry it automatically.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{ApiClient, check_status};
use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse};

impl ApiClient {
    /// Authenticate with username/password via `POST /auth/login`.
    ///
    /// On success the session cookie is stored in the client's jar and the
    /// backend's view of the user (id, username, role) is returned. A 401
    /// here means bad credentials and maps to [`Error::Authentication`].
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        let url = self.endpoint(&["auth", "login"])?;
        debug!("logging in at {}", url);

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let resp = self.http().post(url).json(&body).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "invalid credentials".into(),
            });
        }

        let resp = check_status(resp).await?;
        let text = resp.text().await?;
        let user: LoginResponse =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!("login response: {e}"),
                body: text.clone(),
            })?;

        debug!(user = %user.username, role = %user.role, "login successful");
        Ok(user)
    }

    /// End the current session via `POST /auth/logout`.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.endpoint(&["auth", "logout"])?;
        debug!("logging out at {}", url);
        self.post(url, &serde_json::json!({})).await?;
        debug!("logout complete");
        Ok(())
    }
}

// URL profile endpoints
//
// Profiles are addressed by name rather than by id. Import and export move
// the whole profile set as a single file.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::UrlProfileRecord;

impl ApiClient {
    /// `GET /urlProfiles`
    pub async fn list_url_profiles(&self) -> Result<Vec<UrlProfileRecord>, Error> {
        let url = self.endpoint(&["urlProfiles"])?;
        self.get_json(url).await
    }

    /// `GET /urlProfiles/{name}`
    pub async fn get_url_profile(&self, name: &str) -> Result<UrlProfileRecord, Error> {
        let url = self.endpoint(&["urlProfiles", name])?;
        self.get_json(url).await
    }

    /// `POST /urlProfiles` with `{"name", "urls"}`
    pub async fn create_url_profile(&self, profile: &UrlProfileRecord) -> Result<(), Error> {
        let url = self.endpoint(&["urlProfiles"])?;
        debug!(name = %profile.name, urls = profile.urls.len(), "creating URL profile");
        self.post(url, profile).await
    }

    /// `PUT /urlProfiles/{name}`
    pub async fn update_url_profile(
        &self,
        name: &str,
        profile: &UrlProfileRecord,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["urlProfiles", name])?;
        debug!(name, "updating URL profile");
        self.put(url, profile).await
    }

    /// `DELETE /urlProfiles/{name}`
    pub async fn delete_url_profile(&self, name: &str) -> Result<(), Error> {
        let url = self.endpoint(&["urlProfiles", name])?;
        debug!(name, "deleting URL profile");
        self.delete(url).await
    }

    /// Upload a profile file as multipart field `file`.
    ///
    /// `POST /urlProfiles/import`. A duplicate name comes back as
    /// [`Error::Conflict`], a malformed file as [`Error::BadRequest`].
    pub async fn import_url_profiles(&self, file_name: &str, contents: Vec<u8>) -> Result<(), Error> {
        let url = self.endpoint(&["urlProfiles", "import"])?;
        debug!(file_name, bytes = contents.len(), "importing URL profiles");
        let part = Part::bytes(contents).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);
        self.post_multipart(url, form).await
    }

    /// `GET /urlProfiles/export`
    pub async fn export_url_profiles(&self) -> Result<Vec<u8>, Error> {
        let url = self.endpoint(&["urlProfiles", "export"])?;
        self.get_bytes(url).await
    }
}

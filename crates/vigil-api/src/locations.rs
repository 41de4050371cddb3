// Location (monitored device) endpoints
//
// Besides CRUD, each location exposes a QR code image and a generated
// configuration file. Both are produced by the backend and returned as
// opaque bytes.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{LocationPayload, LocationRecord};

impl ApiClient {
    /// `GET /locations`
    pub async fn list_locations(&self) -> Result<Vec<LocationRecord>, Error> {
        let url = self.endpoint(&["locations"])?;
        self.get_json(url).await
    }

    /// `POST /locations` with `{"name", "urlProfile", "isEnabled"}`
    pub async fn create_location(&self, location: &LocationPayload) -> Result<(), Error> {
        let url = self.endpoint(&["locations"])?;
        debug!(name = %location.name, "creating location");
        self.post(url, location).await
    }

    /// `PUT /locations/{id}`
    pub async fn update_location(&self, id: &str, location: &LocationPayload) -> Result<(), Error> {
        let url = self.endpoint(&["locations", id])?;
        debug!(id, "updating location");
        self.put(url, location).await
    }

    /// `DELETE /locations/{id}`
    pub async fn delete_location(&self, id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["locations", id])?;
        debug!(id, "deleting location");
        self.delete(url).await
    }

    /// Fetch the enrollment QR code image for a location.
    ///
    /// `GET /locations/{id}/qrcode`
    pub async fn location_qrcode(&self, id: &str) -> Result<Vec<u8>, Error> {
        let url = self.endpoint(&["locations", id, "qrcode"])?;
        self.get_bytes(url).await
    }

    /// Download the generated configuration file for a location.
    ///
    /// `GET /locations/{id}/configuration`
    pub async fn location_configuration(&self, id: &str) -> Result<Vec<u8>, Error> {
        let url = self.endpoint(&["locations", id, "configuration"])?;
        self.get_bytes(url).await
    }
}

// Client (peer) endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ClientPayload, ClientRecord};

impl ApiClient {
    /// `GET /clients`
    pub async fn list_clients(&self) -> Result<Vec<ClientRecord>, Error> {
        let url = self.endpoint(&["clients"])?;
        self.get_json(url).await
    }

    /// `POST /clients` with `{"name"}`
    pub async fn create_client(&self, client: &ClientPayload) -> Result<(), Error> {
        let url = self.endpoint(&["clients"])?;
        debug!(name = %client.name, "creating client");
        self.post(url, client).await
    }

    /// `PUT /clients/{id}`
    pub async fn update_client(&self, id: &str, client: &ClientPayload) -> Result<(), Error> {
        let url = self.endpoint(&["clients", id])?;
        debug!(id, "renaming client");
        self.put(url, client).await
    }

    /// `DELETE /clients/{id}`
    pub async fn delete_client(&self, id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["clients", id])?;
        debug!(id, "deleting client");
        self.delete(url).await
    }

    /// `GET /clients/{id}/qrcode`
    pub async fn client_qrcode(&self, id: &str) -> Result<Vec<u8>, Error> {
        let url = self.endpoint(&["clients", id, "qrcode"])?;
        self.get_bytes(url).await
    }

    /// `GET /clients/{id}/configuration`
    pub async fn client_configuration(&self, id: &str) -> Result<Vec<u8>, Error> {
        let url = self.endpoint(&["clients", id, "configuration"])?;
        self.get_bytes(url).await
    }
}

// ── VPN clients ──

use serde::{Deserialize, Serialize};

use crate::liveness::Heartbeat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub latest_handshake_at: Option<String>,
}

impl Heartbeat for Client {
    fn last_contact(&self) -> Option<&str> {
        self.latest_handshake_at.as_deref()
    }
}

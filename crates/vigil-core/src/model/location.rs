// ── Locations (monitored devices) ──

use serde::{Deserialize, Serialize};

use crate::liveness::Heartbeat;

/// A monitored network endpoint bound to a URL profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    /// Name of the URL profile whose links apply to this location.
    pub url_profile: Option<String>,
    /// Raw `latestHandshakeAt`; parsed only by the liveness check.
    pub latest_handshake_at: Option<String>,
    pub is_enabled: bool,
}

impl Heartbeat for Location {
    fn last_contact(&self) -> Option<&str> {
        self.latest_handshake_at.as_deref()
    }
}

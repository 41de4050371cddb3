// ── Home link board ──
//
// Joins locations with the URL profile each one names and renders the
// profile's templates against the location's address.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::liveness::{Heartbeat, Liveness};
use crate::model::{Location, RenderedLink, UrlProfile};

/// One row of the home view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRow {
    pub location: Location,
    pub liveness: Liveness,
    pub links: Vec<RenderedLink>,
}

/// Build the board in location order. A location whose profile is unknown,
/// or that has no address yet, gets no links.
pub fn link_board(
    locations: &[Location],
    profiles: &[UrlProfile],
    reference: DateTime<Utc>,
    threshold: Duration,
) -> Vec<BoardRow> {
    let by_name: HashMap<&str, &UrlProfile> =
        profiles.iter().map(|p| (p.name.as_str(), p)).collect();

    locations
        .iter()
        .map(|location| {
            let links = match (location.url_profile.as_deref(), location.ip_address.as_deref()) {
                (Some(name), Some(ip)) => by_name
                    .get(name)
                    .map(|profile| profile.render(ip))
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            BoardRow {
                location: location.clone(),
                liveness: location.liveness(reference, threshold),
                links,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::liveness::{DEFAULT_ONLINE_THRESHOLD, parse_timestamp};
    use crate::model::UrlTemplate;

    fn location(name: &str, profile: Option<&str>, handshake: Option<&str>) -> Location {
        Location {
            id: format!("id-{name}"),
            name: name.into(),
            ip_address: Some("10.8.0.5".into()),
            url_profile: profile.map(Into::into),
            latest_handshake_at: handshake.map(Into::into),
            is_enabled: true,
        }
    }

    #[test]
    fn rows_follow_location_order_with_links() {
        let profiles = vec![UrlProfile::new(
            "router",
            vec![UrlTemplate::new("web", "http://{ip}/")],
        )];
        let locations = vec![
            location("HQ", Some("router"), Some("2025-03-01T11:58:00Z")),
            location("Lab", Some("missing"), None),
        ];
        let now = parse_timestamp("2025-03-01T12:00:00Z").unwrap();

        let board = link_board(&locations, &profiles, now, DEFAULT_ONLINE_THRESHOLD);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].liveness, Liveness::Online);
        assert_eq!(board[0].links[0].url, "http://10.8.0.5/");
        assert_eq!(board[1].liveness, Liveness::Offline);
        assert!(board[1].links.is_empty());
    }

    #[test]
    fn no_address_no_links() {
        let profiles = vec![UrlProfile::new(
            "router",
            vec![UrlTemplate::new("web", "http://{ip}/")],
        )];
        let mut loc = location("Pending", Some("router"), None);
        loc.ip_address = None;

        let board = link_board(&[loc], &profiles, Utc::now(), DEFAULT_ONLINE_THRESHOLD);
        assert!(board[0].links.is_empty());
    }
}

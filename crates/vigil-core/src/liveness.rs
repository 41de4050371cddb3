// ── Liveness predicate ──
//
// Decides whether a device is online from its most recent handshake.
// Pure: the reference instant is always passed in, never read here,
// except in `is_online_now`.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::trace;

/// A handshake older (or further in the future) than this is offline.
pub const DEFAULT_ONLINE_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Offset-less date-time layouts accepted after RFC 3339; read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Rendered result of the liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Online,
    Offline,
}

impl Liveness {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl From<bool> for Liveness {
    fn from(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }
}

/// Anything the backend stamps with a last-contact time.
pub trait Heartbeat {
    /// Raw `latestHandshakeAt` value, if the backend sent one.
    fn last_contact(&self) -> Option<&str>;

    fn liveness(&self, reference: DateTime<Utc>, threshold: Duration) -> Liveness {
        is_online(self.last_contact(), reference, threshold).into()
    }
}

/// `true` iff `last_contact` parses and lies within `threshold` of
/// `reference`, in either direction.
///
/// An absent or unparseable timestamp is offline. The comparison uses the
/// absolute difference, so a timestamp slightly ahead of the reference
/// clock (skew) still counts as online.
pub fn is_online(last_contact: Option<&str>, reference: DateTime<Utc>, threshold: Duration) -> bool {
    let Some(raw) = last_contact else {
        return false;
    };
    let Some(contact) = parse_timestamp(raw) else {
        trace!(raw, "unparseable handshake timestamp");
        return false;
    };
    let limit = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
    reference.signed_duration_since(contact).abs() <= limit
}

/// [`is_online`] against the wall clock.
pub fn is_online_now(last_contact: Option<&str>, threshold: Duration) -> bool {
    is_online(last_contact, Utc::now(), threshold)
}

/// Parse a backend timestamp: RFC 3339 first, then offset-less ISO 8601
/// date-times and bare dates, both taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    const REF: &str = "2025-03-01T12:00:00Z";

    #[test]
    fn exactly_at_threshold_is_online() {
        assert!(is_online(
            Some("2025-03-01T11:55:00Z"),
            at(REF),
            DEFAULT_ONLINE_THRESHOLD
        ));
    }

    #[test]
    fn one_second_past_threshold_is_offline() {
        assert!(!is_online(
            Some("2025-03-01T11:54:59Z"),
            at(REF),
            DEFAULT_ONLINE_THRESHOLD
        ));
    }

    #[test]
    fn absent_timestamp_is_offline() {
        assert!(!is_online(None, at(REF), DEFAULT_ONLINE_THRESHOLD));
        assert!(!is_online(None, at(REF), Duration::MAX));
        assert!(!is_online(None, DateTime::<Utc>::MIN_UTC, Duration::ZERO));
    }

    #[test]
    fn future_timestamp_within_threshold_is_online() {
        assert!(is_online(
            Some("2025-03-01T12:03:00Z"),
            at(REF),
            DEFAULT_ONLINE_THRESHOLD
        ));
        assert!(!is_online(
            Some("2025-03-01T12:06:00Z"),
            at(REF),
            DEFAULT_ONLINE_THRESHOLD
        ));
    }

    #[test]
    fn garbage_is_offline() {
        for raw in ["", "yesterday", "2025-13-45T99:00:00Z", "12:00"] {
            assert!(
                !is_online(Some(raw), at(REF), DEFAULT_ONLINE_THRESHOLD),
                "{raw:?} should be offline"
            );
        }
    }

    #[test]
    fn accepts_offsets_and_naive_forms() {
        let threshold = Duration::from_secs(60);
        assert!(is_online(Some("2025-03-01T13:00:30+01:00"), at(REF), threshold));
        assert!(is_online(Some("2025-03-01T11:59:30.250"), at(REF), threshold));
        assert!(is_online(Some("2025-03-01 11:59:30"), at(REF), threshold));
        assert_eq!(
            parse_timestamp("2025-03-01").unwrap(),
            at("2025-03-01T00:00:00Z")
        );
    }

    #[test]
    fn huge_threshold_does_not_overflow() {
        assert!(is_online(Some("1970-01-01T00:00:00Z"), at(REF), Duration::MAX));
    }

    #[test]
    fn heartbeat_default_liveness() {
        struct Probe(Option<&'static str>);
        impl Heartbeat for Probe {
            fn last_contact(&self) -> Option<&str> {
                self.0
            }
        }

        let reference = at(REF);
        assert_eq!(
            Probe(Some("2025-03-01T11:58:00Z")).liveness(reference, DEFAULT_ONLINE_THRESHOLD),
            Liveness::Online
        );
        assert_eq!(
            Probe(None).liveness(reference, DEFAULT_ONLINE_THRESHOLD),
            Liveness::Offline
        );
        assert_eq!(Liveness::Online.to_string(), "online");
    }
}

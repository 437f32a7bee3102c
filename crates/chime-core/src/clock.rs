//! Reference-zone time handling.
//!
//! All scheduling arithmetic happens in one fixed UTC offset (the "reference
//! zone", default `+05:30`). Every timestamp that enters the system goes
//! through [`normalize_timestamp`]: offset-bearing strings are converted into
//! the reference zone, naive strings are assumed to already be in it.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::{ChimeError, Result};

/// Accepted layouts for naive (offset-less) timestamps.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The single fixed time zone all scheduling arithmetic is performed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone(FixedOffset);

impl ReferenceZone {
    /// Parse an offset spec like `+05:30` or `-08:00`.
    ///
    /// This must succeed before the service can start; a bad offset is a
    /// startup-time configuration failure, never a per-record one.
    pub fn parse(spec: &str) -> Result<Self> {
        let bad = || ChimeError::ReferenceZone(format!("expected +HH:MM or -HH:MM, got {spec:?}"));

        let (sign, rest) = match spec.as_bytes().first() {
            Some(b'+') => (1i32, &spec[1..]),
            Some(b'-') => (-1i32, &spec[1..]),
            _ => return Err(bad()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(bad)?;
        let hours: i32 = hours.parse().map_err(|_| bad())?;
        let minutes: i32 = minutes.parse().map_err(|_| bad())?;
        if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
            return Err(bad());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(ReferenceZone)
            .ok_or_else(bad)
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Current instant in the reference zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.0)
    }

    /// See [`normalize_timestamp`].
    pub fn normalize(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        normalize_timestamp(raw, self.0)
    }
}

/// Normalise an ingested timestamp string into `zone`.
///
/// Offset-bearing strings (RFC 3339) are converted; naive strings are assumed
/// to already be in the reference zone. Returns `None` on anything
/// unparsable — callers treat that the same as the timestamp being absent.
pub fn normalize_timestamp(raw: &str, zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.with_timezone(&zone));
    }

    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .and_then(|naive| naive.and_local_timezone(zone).single())
    })
}

/// Source of truth for "now". The driver takes this as a trait so tests can
/// pin the clock to a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock mapped into the reference zone.
pub struct SystemClock {
    zone: ReferenceZone,
}

impl SystemClock {
    pub fn new(zone: ReferenceZone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.zone.now()
    }
}

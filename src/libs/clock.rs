//! Time source and timestamp encoding.
//!
//! All persisted timestamps are UTC with microsecond precision and are
//! written as fixed-width RFC 3339 strings (`2025-01-15T09:30:00.000000Z`).
//! The fixed width makes lexicographic order equal chronological order,
//! which the `reminder_at`, `created_at` and `timestamp` indexes rely on.

use chrono::{DateTime, Datelike, SecondsFormat, TimeDelta, Timelike, Utc};
use parking_lot::Mutex;

/// Source of "now" for the store and every repository.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock that never repeats or goes backwards.
///
/// Two calls within the same microsecond (or after a backwards clock jump)
/// yield `last + 1µs`, so `updated_at` and time-derived `sort_order` values
/// strictly increase for the lifetime of the handle.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let wall = truncate_micros(Utc::now());
        let next = match *last {
            Some(prev) if wall <= prev => prev + TimeDelta::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

/// Clock pinned to one instant, advancing 1µs per call.
///
/// Used by tests that need predictable due dates.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(truncate_micros(instant)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut current = self.current.lock();
        *current += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.current.lock();
        let now = *current;
        *current += TimeDelta::microseconds(1);
        now
    }
}

fn truncate_micros(instant: DateTime<Utc>) -> DateTime<Utc> {
    let micros = instant.nanosecond() / 1_000 * 1_000;
    instant.with_nanosecond(micros).unwrap_or(instant)
}

/// Whether `instant` fits the four-digit year of the persisted form.
///
/// Years outside 0000..=9999 would be written with a sign and break both
/// parsing and ordering, so repositories refuse them.
pub fn is_storable(instant: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&instant.year())
}

/// Renders a timestamp in the fixed-width persisted form.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod rfc3339 {
    use super::format_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    /// Same encoding for nullable timestamps; `None` is written as `null`.
    pub mod option {
        use super::format_timestamp;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(instant: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
            match instant {
                Some(instant) => serializer.serialize_str(&format_timestamp(instant)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|instant| instant.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}

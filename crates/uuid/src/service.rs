//! Internal implementation of UUID services.
//!
//! This module contains the implementation details for the canonical UUID wrapper and the
//! timestamp-prefixed identifiers used throughout the catalog.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::{Mutex, PoisonError};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical UUID representation (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to display in canonical form.
///
/// # Construction
/// - [`UuidService::new`] generates a new random (version 4) UUID.
/// - [`UuidService::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UuidService(Uuid);

impl Default for UuidService {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidService {
    /// Generates a new UUID in canonical form.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// This does **not** normalise other common UUID forms (for example, hyphenated or
    /// uppercase).
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("Invalid UUID '{}': {}", input, e)))
    }

    /// Returns the inner `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical UUID form.
    ///
    /// This is a purely syntactic check: exactly 32 bytes, lowercase hex only.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for UuidService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for UuidService {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidService::parse(s)
    }
}

/// A time-prefixed unique identifier.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example:
/// `20261018T101500.123Z-550e8400e29b41d4a716446655440000`
///
/// The timestamp is held at millisecond precision so that the string form round-trips
/// exactly. Because the timestamp prefix has a fixed width, lexicographic order of the
/// string form matches creation order.
///
/// # Monotonicity Guarantee
///
/// When calling [`TimestampId::generate`] with the previous identifier, the timestamp is
/// guaranteed to be strictly greater than the previous one (incremented by 1ms if
/// necessary).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampId {
    timestamp: DateTime<Utc>,
    uuid: UuidService,
}

impl TimestampId {
    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> &UuidService {
        &self.uuid
    }

    /// Generate a new identifier.
    ///
    /// If `last_id` is provided, the timestamp is guaranteed to be strictly greater than
    /// the last one (by at least 1 ms).
    pub fn generate(last_id: Option<&TimestampId>) -> Self {
        let now = Utc::now().trunc_subsecs(3);

        let timestamp = match last_id {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: UuidService::new(),
        }
    }
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid timestamp id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive =
            chrono::NaiveDateTime::parse_from_str(ts_no_z, "%Y%m%dT%H%M%S%.3f").map_err(|e| {
                UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
            })?;

        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        let uuid = UuidService::parse(uuid_str)?;

        Ok(Self { timestamp, uuid })
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            self.uuid
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimestampId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimestampId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hands out [`TimestampId`]s in strictly increasing order.
///
/// Shared by every writer in a process; the last issued id is kept behind a mutex.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    last: Mutex<Option<TimestampId>>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh identifier, later than every identifier issued before it.
    pub fn next_id(&self) -> TimestampId {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let id = TimestampId::generate(last.as_ref());
        *last = Some(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_new_generates_valid_uuid() {
        let canonical = UuidService::new().to_string();

        assert_eq!(canonical.len(), 32);
        assert!(UuidService::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_valid_canonical_uuid() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let parsed = UuidService::parse(canonical).unwrap();

        assert_eq!(parsed.to_string(), canonical);
        assert_eq!(
            parsed.uuid().simple().to_string(),
            "550e8400e29b41d4a716446655440000"
        );
    }

    #[test]
    fn test_parse_rejects_hyphenated_uuid() {
        let result = UuidService::parse("550e8400-e29b-41d4-a716-446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_is_canonical_invalid() {
        assert!(!UuidService::is_canonical(
            "550E8400E29B41D4A716446655440000"
        ));
        assert!(!UuidService::is_canonical(
            "550e8400e29b41d4a71644665544000"
        ));
        assert!(!UuidService::is_canonical(
            "550e8400e29b41d4a716446655440zzz"
        ));
        assert!(!UuidService::is_canonical(""));
    }

    #[test]
    fn test_timestamp_id_generate_monotonic_same_instant() {
        let id1 = TimestampId::generate(None);
        let id2 = TimestampId::generate(Some(&id1));

        assert!(id2.timestamp() > id1.timestamp());
        assert!(id2.to_string() > id1.to_string());
    }

    #[test]
    fn test_timestamp_id_display_format() {
        let displayed = TimestampId::generate(None).to_string();

        let (ts, uuid) = displayed.split_once('-').unwrap();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "20261018T101500.123Z".len());
        assert!(UuidService::is_canonical(uuid));
    }

    #[test]
    fn test_timestamp_id_round_trip() {
        let original_str = "20261018T101500.123Z-550e8400e29b41d4a716446655440000";
        let original = TimestampId::from_str(original_str).unwrap();

        assert_eq!(original.to_string(), original_str);
        assert_eq!(
            original.uuid().to_string(),
            "550e8400e29b41d4a716446655440000"
        );
    }

    #[test]
    fn test_timestamp_id_generated_round_trips() {
        let id = TimestampId::generate(None);
        let parsed: TimestampId = id.to_string().parse().unwrap();

        assert_eq!(id, parsed);
    }

    #[test]
    fn test_timestamp_id_parse_missing_hyphen() {
        let result = TimestampId::from_str("20261018T101500.123Z550e8400e29b41d4a716446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("Invalid timestamp id format"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_timestamp_id_parse_missing_z_suffix() {
        let result = TimestampId::from_str("20261018T101500.123-550e8400e29b41d4a716446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => assert!(msg.contains("must end with 'Z'")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_timestamp_id_rejects_legacy_millisecond_ids() {
        assert!(TimestampId::from_str("1729246500123").is_err());
    }

    #[test]
    fn test_timestamp_id_serde_as_string() {
        let original_str = "20261018T101500.123Z-550e8400e29b41d4a716446655440000";
        let id = TimestampId::from_str(original_str).unwrap();

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", original_str));

        let back: TimestampId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_generator_is_strictly_increasing() {
        let generator = TimestampIdGenerator::new();
        let ids: Vec<TimestampId> = (0..50).map(|_| generator.next_id()).collect();

        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1].to_string() > pair[0].to_string());
        }
    }

    #[test]
    fn test_generator_unique_across_threads() {
        let generator = Arc::new(TimestampIdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| generator.next_id().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 200);
    }
}

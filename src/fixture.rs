//! The sample record every codec encodes and decodes.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable sample record shared by every codec and every iteration.
///
/// `created_at` is held at millisecond precision, the finest resolution all
/// of the built-in formats preserve. Fields are private so every value goes
/// through [`Fixture::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    id: i64,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Fixture {
    pub fn new(id: i64, name: impl Into<String>, is_active: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active,
            created_at: created_at.trunc_subsecs(3),
        }
    }

    /// `{id: 1, name: "Alice", is_active: true, created_at: 2024-01-01T00:00:00Z}`
    pub fn standard() -> Self {
        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH);
        Self::new(1, "Alice", true, created_at)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_fixture_matches_reference_record() {
        let f = Fixture::standard();
        assert_eq!(f.id(), 1);
        assert_eq!(f.name(), "Alice");
        assert!(f.is_active());
        assert_eq!(f.created_at().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn constructor_truncates_to_milliseconds() {
        let ts = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let f = Fixture::new(7, "x", false, ts);
        assert_eq!(f.created_at().timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn extreme_years_survive_the_constructor() {
        let ancient = Utc.with_ymd_and_hms(-5, 6, 1, 0, 0, 0).unwrap();
        let far = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Fixture::new(1, "a", true, ancient).created_at(), ancient);
        assert_eq!(Fixture::new(1, "a", true, far).created_at(), far);
    }
}

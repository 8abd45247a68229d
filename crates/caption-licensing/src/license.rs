//! License Records
//!
//! A license grants access while `now < active_until`. Expiry is lazy:
//! validity is recomputed against the clock on every check, so a record
//! never transitions into a distinct expired state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque license key supplied by the payment provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Wrap a raw key string. Lookups match exactly; no normalization.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A license record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// License key, immutable once created
    pub key: LicenseKey,

    /// Purchaser email, informational only
    pub email: String,

    /// Instant after which the license is no longer valid
    pub active_until: DateTime<Utc>,

    /// Set at first insert, never mutated
    pub created_at: DateTime<Utc>,
}

impl LicenseRecord {
    /// Create a new record as of `now`
    pub fn new(
        key: LicenseKey,
        email: impl Into<String>,
        active_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            email: email.into(),
            active_until,
            created_at: now,
        }
    }

    /// Strict less-than: a license whose `active_until` equals `now`
    /// is already expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.active_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validity_boundary() {
        let until = Utc.with_ymd_and_hms(2025, 6, 19, 0, 0, 0).unwrap();
        let record = LicenseRecord::new(
            LicenseKey::new("KEY-1"),
            "buyer@example.com",
            until,
            until - chrono::Duration::days(30),
        );

        assert!(record.is_valid_at(until - chrono::Duration::seconds(1)));
        assert!(!record.is_valid_at(until));
        assert!(!record.is_valid_at(until + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_key_matches_exactly() {
        assert_ne!(LicenseKey::new("abc"), LicenseKey::new("ABC"));
    }
}

//! Test fixtures with sample data.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Sample principal record, before its password is hashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SamplePrincipal {
    /// Identifier
    pub id: i64,
    /// Unique email
    pub email: String,
    /// Plaintext password (hash it before storing)
    pub password: String,
    /// Display name
    pub name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl SamplePrincipal {
    /// The reference principal used in end-to-end scenarios.
    #[must_use]
    pub fn alice() -> Self {
        Self::new(1, "alice@mail.com", "123456", "Alice")
    }

    /// A second principal, for isolation checks.
    #[must_use]
    pub fn bob() -> Self {
        Self::new(2, "bob@mail.com", "hunter22", "Bob")
    }

    /// Build a sample principal with fixed timestamps.
    #[must_use]
    pub fn new(id: i64, email: &str, password: &str, name: &str) -> Self {
        let created_at = fixed_timestamp();
        Self {
            id,
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            created_at,
            updated_at: created_at,
        }
    }
}

/// A fixed instant so fixtures compare equal across runs.
#[must_use]
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Shared HMAC secret used by token tests.
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-property-testing-32b";

/// A different secret, for signature-mismatch checks.
pub const OTHER_JWT_SECRET: &str = "another-secret-key-that-must-not-verify";

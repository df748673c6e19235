//! Shared proptest generators.
//!
//! Reusable strategies for the data that flows through credential and
//! token handling: email addresses, passwords, display names, ids and TTLs.

use proptest::prelude::*;
use std::time::Duration;

/// Generate well-formed email addresses of at most 100 characters.
pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z0-9._%+-]{1,30}", "[a-z0-9-]{1,20}", "[a-z]{2,6}")
        .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
}

/// Generate strings that are not email addresses (no `@`, or nothing around it).
pub fn malformed_email_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9.]{1,30}",
        "@[a-z]{1,10}\\.[a-z]{2,4}",
        "[a-z]{1,10}@",
        "[a-z]{1,10}@[a-z]{1,10}",
        "[a-z]{1,5} [a-z]{1,5}@[a-z]{1,5}\\.com",
    ]
}

/// Generate acceptable plaintext passwords (1 to 100 characters).
pub fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%^&*()_+=-]{1,100}"
}

/// Generate a pair of distinct passwords.
pub fn distinct_passwords_strategy() -> impl Strategy<Value = (String, String)> {
    (password_strategy(), password_strategy()).prop_filter("passwords must differ", |(a, b)| a != b)
}

/// Generate display names.
pub fn display_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,15}( [A-Z][a-z]{1,15})?"
}

/// Generate positive principal identifiers.
pub fn principal_id_strategy() -> impl Strategy<Value = i64> {
    1i64..i64::from(i32::MAX)
}

/// Generate access-token lifetimes (1 second to 15 minutes).
pub fn access_ttl_strategy() -> impl Strategy<Value = Duration> {
    (1u64..900).prop_map(Duration::from_secs)
}

/// Generate refresh-token lifetimes (1 hour to 30 days).
pub fn refresh_ttl_strategy() -> impl Strategy<Value = Duration> {
    (3600u64..2_592_000).prop_map(Duration::from_secs)
}

/// Generate opaque strings that are not compact JWS tokens.
pub fn garbage_token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{0,64}",
        "[a-zA-Z0-9_-]{1,20}\\.[a-zA-Z0-9_-]{1,20}",
        "[a-zA-Z0-9_-]{1,20}\\.[a-zA-Z0-9_-]{1,20}\\.[a-zA-Z0-9_-]{1,20}",
    ]
}

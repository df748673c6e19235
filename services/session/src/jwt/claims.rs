//! Claim set and token kinds.

use crate::config::TokenPolicy;
use crate::principal::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kind discriminant, carried as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived, authorizes ordinary requests
    Access,
    /// Long-lived, authorizes minting a new access token only
    Refresh,
}

impl TokenType {
    /// Claim and metric label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts embedded in a token.
///
/// `sub` must be a JSON integer. A string subject fails deserialization
/// instead of being coerced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimSet {
    /// Principal id
    #[serde(rename = "sub")]
    pub subject: i64,
    /// Principal email at minting time
    pub email: String,
    /// Token kind
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Expiry, seconds since the Unix epoch
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl ClaimSet {
    /// Claims for `principal` of the given kind, expiring one policy TTL
    /// after `now`.
    #[must_use]
    pub fn for_principal(
        token_type: TokenType,
        principal: &Principal,
        policy: &TokenPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let ttl = match token_type {
            TokenType::Access => policy.access_ttl(),
            TokenType::Refresh => policy.refresh_ttl(),
        };
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            subject: principal.id,
            email: principal.email.clone(),
            token_type,
            expires_at: now.timestamp().saturating_add(ttl_secs),
        }
    }

    /// Access claims for `principal`.
    #[must_use]
    pub fn access(principal: &Principal, policy: &TokenPolicy, now: DateTime<Utc>) -> Self {
        Self::for_principal(TokenType::Access, principal, policy, now)
    }

    /// Refresh claims for `principal`.
    #[must_use]
    pub fn refresh(principal: &Principal, policy: &TokenPolicy, now: DateTime<Utc>) -> Self {
        Self::for_principal(TokenType::Refresh, principal, policy, now)
    }

    /// Whether the token is of the given kind.
    #[must_use]
    pub fn is_kind(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    /// Whether the token has expired at `timestamp` (seconds). A token is
    /// expired from its `exp` second onward.
    #[must_use]
    pub const fn is_expired_at(&self, timestamp: i64) -> bool {
        self.expires_at <= timestamp
    }
}

//! Principal records and the request/response shapes built around them.

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum length of an email address, in characters.
pub const MAX_EMAIL_LEN: usize = 100;

/// Maximum length of a plaintext password, in characters.
pub const MAX_PASSWORD_LEN: usize = 100;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// An account that can authenticate. Owned by the credential store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identifier, embedded as the token subject
    pub id: i64,
    /// Unique email address
    pub email: String,
    /// One-way hash of the password
    pub secret_hash: String,
    /// Display name
    #[serde(alias = "name")]
    pub display_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("secret_hash", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// The externally visible projection of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalView {
    /// Identifier
    pub id: i64,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            email: principal.email.clone(),
            name: principal.display_name.clone(),
        }
    }
}

/// Login input. The password is wiped when the request is dropped.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

impl LoginRequest {
    /// Create a login request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] naming the first broken rule.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() {
            return Err(AuthError::validation("email is required"));
        }
        if self.email.chars().count() > MAX_EMAIL_LEN {
            return Err(AuthError::validation(format!(
                "email must be at most {MAX_EMAIL_LEN} characters"
            )));
        }
        if !EMAIL_PATTERN.is_match(&self.email) {
            return Err(AuthError::validation("email is not a valid address"));
        }
        if self.password.is_empty() {
            return Err(AuthError::validation("password is required"));
        }
        if self.password.chars().count() > MAX_PASSWORD_LEN {
            return Err(AuthError::validation(format!(
                "password must be at most {MAX_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Refresh input.
#[derive(Clone, Deserialize)]
pub struct RefreshRequest {
    /// A previously issued refresh token
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Identity attached to a request after its access token checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Token subject
    pub principal_id: i64,
}

/// Successful login result.
#[derive(Clone, Serialize)]
pub struct LoginOutcome {
    /// Who logged in
    pub user: PrincipalView,
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

impl fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Successful refresh result.
#[derive(Clone, Serialize)]
pub struct RefreshOutcome {
    /// Newly minted access token
    pub access_token: String,
}

impl fmt::Debug for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshOutcome")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

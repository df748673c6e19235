//! Authentication core: login, refresh and access-token checks.
//!
//! Every public operation returns an [`AuthError`] already classified into
//! one caller-facing kind. Internal failures are logged here with their
//! full chain, before the detail is discarded at the boundary.

mod access;
mod login;
mod refresh;

use crate::config::TokenPolicy;
use crate::error::AuthError;
use crate::jwt::{ClaimSet, TokenCodec};
use crate::metrics;
use crate::password::PasswordVerifier;
use crate::store::CredentialStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Default deadline for one credential store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Login, refresh and access-token verification over shared collaborators.
///
/// Holds no per-request state. Clone it freely; clones share the
/// collaborators.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn PasswordVerifier>,
    codec: TokenCodec,
    policy: TokenPolicy,
    store_timeout: Duration,
}

impl AuthService {
    /// Create a service.
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
        codec: TokenCodec,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            codec,
            policy,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Set the per-call credential store deadline.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Token lifetimes in effect.
    #[must_use]
    pub const fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// The codec tokens are minted and verified with.
    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn mint(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        let token = self.codec.mint(claims)?;
        metrics::record_token_issued(claims.token_type.as_str());
        Ok(token)
    }
}

/// Log an internal failure with its full chain.
fn log_internal(operation: &'static str, err: &AuthError) {
    if let AuthError::Internal(inner) = err {
        error!(operation, error = ?inner, "Internal failure");
    }
}

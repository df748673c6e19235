//! Password hash verification.

use async_trait::async_trait;
use thiserror::Error;

/// Password verification failures. A mismatch is not an error.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// The stored hash could not be parsed, or hashing failed
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[source] bcrypt::BcryptError),

    /// The blocking verification task did not complete
    #[error("Password verification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// One-way password comparison.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// Whether `plaintext` is the password `hash` was produced from.
    async fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, PasswordError>;
}

/// bcrypt verifier. Hash comparison runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

#[async_trait]
impl PasswordVerifier for BcryptVerifier {
    async fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, PasswordError> {
        let hash = hash.to_owned();
        let plaintext = zeroize::Zeroizing::new(plaintext.to_owned());

        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext.as_bytes(), &hash))
            .await?
            .map_err(PasswordError::Bcrypt)
    }
}

/// Hash a password with bcrypt at the given cost.
///
/// # Errors
///
/// Returns an error if the cost is out of range.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, cost).map_err(PasswordError::Bcrypt)
}

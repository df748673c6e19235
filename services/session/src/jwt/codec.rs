//! HS256 compact token codec.

use super::claims::ClaimSet;
use crate::config::JwtSecret;
use crate::error::TokenError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use tracing::debug;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies claim sets with a shared secret.
///
/// Stateless apart from the key material, so one instance is shared by
/// every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the given secret.
    #[must_use]
    pub fn new(secret: &JwtSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against our own clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose()),
            decoding_key: DecodingKey::from_secret(secret.expose()),
            validation,
        }
    }

    /// Sign a claim set.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn mint(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] for any failure.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as of `now` (seconds since the Unix epoch).
    ///
    /// Decoding, signature, algorithm, claim-shape and expiry failures
    /// all collapse into [`TokenError::InvalidToken`]. The reason is only
    /// logged at debug level.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] for any failure.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<ClaimSet, TokenError> {
        let claims = decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(reason = %e, "Token rejected");
                TokenError::InvalidToken
            })?
            .claims;

        if claims.is_expired_at(now) {
            debug!(
                token_type = %claims.token_type,
                expires_at = claims.expires_at,
                "Token rejected: expired"
            );
            return Err(TokenError::InvalidToken);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

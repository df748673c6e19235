//! Error taxonomy for the session service.
//!
//! Every failure leaving the authentication core is exactly one
//! [`AuthError`] kind. Storage and cryptographic errors are folded into
//! [`AuthError::Internal`] at the orchestrator boundary, and the caller only
//! ever sees an [`ErrorResponse`] with a stable code and a fixed message.

use rust_common::PlatformError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token codec failures.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Decoding, signature, algorithm, expiry or claim-shape check failed.
    ///
    /// Deliberately carries no detail about which check it was.
    #[error("Invalid token")]
    InvalidToken,

    /// The claim set could not be signed
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Authentication-domain error, classified at the orchestrator boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed caller input
    #[error("Validation failed: {reason}")]
    Validation {
        /// Which rule the input broke
        reason: String,
    },

    /// Unknown email or wrong password, indistinguishable on purpose
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token failed verification, had the wrong kind, or names a
    /// principal that no longer exists
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Access token failed verification or had the wrong kind
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Store, signing or unit-of-work failure (details never exposed)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::BadRequest,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::InvalidRefreshToken => ErrorCode::InvalidRefreshToken,
            Self::InvalidAccessToken => ErrorCode::InvalidAccessToken,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether this is an internal failure that needs operator attention.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<PlatformError> for AuthError {
    fn from(err: PlatformError) -> Self {
        Self::Internal(anyhow::Error::new(err).context("credential store failure"))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            // Verification failures must be mapped by the caller to the
            // kind-specific variant; reaching here means a mint path failed.
            TokenError::InvalidToken => {
                Self::Internal(anyhow::anyhow!("unexpected token verification failure"))
            }
            TokenError::Signing(e) => {
                Self::Internal(anyhow::Error::new(e).context("token signing failure"))
            }
        }
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed request
    BadRequest,
    /// Login rejected
    InvalidCredentials,
    /// Refresh rejected
    InvalidRefreshToken,
    /// Access token rejected
    InvalidAccessToken,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Wire representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "ERR_BAD_REQUEST",
            Self::InvalidCredentials => "ERR_INVALID_CREDS",
            Self::InvalidRefreshToken => "ERR_INVALID_REFRESH_TOKEN",
            Self::InvalidAccessToken => "ERR_INVALID_ACCESS_TOKEN",
            Self::Internal => "ERR_INTERNAL_ERROR",
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::InvalidCredentials | Self::InvalidRefreshToken | Self::InvalidAccessToken => 401,
            Self::Internal => 500,
        }
    }

    /// Fixed caller-facing message for this error.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::BadRequest => "invalid request",
            Self::InvalidCredentials => "incorrect email or password",
            Self::InvalidRefreshToken => "invalid refresh token",
            Self::InvalidAccessToken => "invalid access token",
            Self::Internal => "internal server error",
        }
    }

    /// Metric label for this error.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidRefreshToken => "invalid_refresh_token",
            Self::InvalidAccessToken => "invalid_access_token",
            Self::Internal => "internal",
        }
    }
}

/// Structured error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,
    /// Stable error code
    pub err: String,
    /// Generic human-readable message
    pub msg: String,
}

impl ErrorResponse {
    /// Build the caller-facing response for an error.
    ///
    /// Only validation errors carry their reason, since it describes the
    /// caller's own input. Every other kind uses the fixed message.
    #[must_use]
    pub fn from_error(error: &AuthError) -> Self {
        let code = error.code();
        let msg = match error {
            AuthError::Validation { reason } => reason.clone(),
            _ => code.message().to_string(),
        };

        Self {
            ok: false,
            err: code.as_str().to_string(),
            msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AuthError::validation("x").code().as_str(), "ERR_BAD_REQUEST");
        assert_eq!(AuthError::InvalidCredentials.code().as_str(), "ERR_INVALID_CREDS");
        assert_eq!(
            AuthError::InvalidRefreshToken.code().as_str(),
            "ERR_INVALID_REFRESH_TOKEN"
        );
        assert_eq!(
            AuthError::InvalidAccessToken.code().as_str(),
            "ERR_INVALID_ACCESS_TOKEN"
        );
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom")).code().as_str(),
            "ERR_INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_http_statuses() {
        assert_eq!(ErrorCode::BadRequest.http_status(), 400);
        assert_eq!(ErrorCode::InvalidCredentials.http_status(), 401);
        assert_eq!(ErrorCode::InvalidRefreshToken.http_status(), 401);
        assert_eq!(ErrorCode::InvalidAccessToken.http_status(), 401);
        assert_eq!(ErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err: AuthError = PlatformError::unavailable("postgres at 10.0.0.7:5432 refused").into();
        assert!(err.is_internal());

        let response = ErrorResponse::from_error(&err);
        assert!(!response.ok);
        assert_eq!(response.err, "ERR_INTERNAL_ERROR");
        assert_eq!(response.msg, "internal server error");
        assert!(!response.msg.contains("10.0.0.7"));
    }

    #[test]
    fn test_validation_reason_is_exposed() {
        let response = ErrorResponse::from_error(&AuthError::validation("email is required"));
        assert_eq!(response.err, "ERR_BAD_REQUEST");
        assert_eq!(response.msg, "email is required");
    }

    #[test]
    fn test_signing_error_is_internal() {
        let jwt_err = jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat);
        let err: AuthError = TokenError::Signing(jwt_err).into();
        assert_eq!(err.code(), ErrorCode::Internal);
    }
}

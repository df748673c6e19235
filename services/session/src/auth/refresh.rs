use super::{log_internal, AuthService};
use crate::error::AuthError;
use crate::jwt::{ClaimSet, TokenType};
use crate::metrics;
use crate::principal::RefreshOutcome;
use crate::store::with_deadline;
use chrono::Utc;
use tracing::{info, instrument, warn};

impl AuthService {
    /// Exchange a refresh token for a new access token.
    ///
    /// The new token is built from the principal as stored now, not from
    /// the claims carried by the old token. The refresh token itself is not
    /// rotated and stays usable until it expires.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidRefreshToken`] if the token does not verify,
    ///   is not a refresh token, or names a principal that no longer exists
    /// - [`AuthError::Internal`] for store or signing failures
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
        let result = self.exchange(refresh_token).await;

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.code().label(),
        };
        metrics::record_token_refreshed(status);
        if let Err(e) = &result {
            log_internal("refresh", e);
        }

        result
    }

    async fn exchange(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
        let claims = match self.codec.verify(refresh_token) {
            Ok(claims) => claims,
            Err(_) => {
                metrics::record_token_verification(TokenType::Refresh.as_str(), "invalid");
                warn!("Refresh rejected: token did not verify");
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        if !claims.is_kind(TokenType::Refresh) {
            metrics::record_token_verification(TokenType::Refresh.as_str(), "wrong_kind");
            warn!(
                principal_id = claims.subject,
                token_type = %claims.token_type,
                "Refresh rejected: wrong token kind"
            );
            return Err(AuthError::InvalidRefreshToken);
        }
        metrics::record_token_verification(TokenType::Refresh.as_str(), "valid");

        let found = with_deadline(
            self.store_timeout,
            "find_by_id",
            self.store.find_by_id(claims.subject),
        )
        .await?;
        let Some(principal) = found else {
            warn!(principal_id = claims.subject, "Refresh rejected: principal no longer exists");
            return Err(AuthError::InvalidRefreshToken);
        };

        let access_token = self.mint(&ClaimSet::access(&principal, &self.policy, Utc::now()))?;

        info!(principal_id = principal.id, "Access token refreshed");
        Ok(RefreshOutcome { access_token })
    }
}

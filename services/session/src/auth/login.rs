use super::{log_internal, AuthService};
use crate::error::AuthError;
use crate::jwt::ClaimSet;
use crate::metrics;
use crate::principal::{LoginOutcome, LoginRequest, PrincipalView};
use crate::store::with_deadline;
use chrono::Utc;
use tracing::{info, instrument, warn};

impl AuthService {
    /// Authenticate with email and password, issuing an access and a
    /// refresh token.
    ///
    /// Lookup and password check run inside one read transaction. If that
    /// transaction cannot be committed the login fails as internal, even
    /// though the password matched.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed request
    /// - [`AuthError::InvalidCredentials`] for an unknown email or wrong
    ///   password, identically
    /// - [`AuthError::Internal`] for store, hashing, signing or commit
    ///   failures
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let result = self.authenticate(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.code().label(),
        };
        metrics::record_login_attempt(outcome);
        if let Err(e) = &result {
            log_internal("login", e);
        }

        result
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Login rejected: invalid request");
            return Err(e);
        }

        let mut tx = with_deadline(self.store_timeout, "begin_read", self.store.begin_read()).await?;

        let found = with_deadline(
            self.store_timeout,
            "find_by_email",
            tx.find_by_email(&request.email),
        )
        .await?;
        let Some(principal) = found else {
            warn!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verifier
            .verify(&principal.secret_hash, &request.password)
            .await
            .map_err(|e| {
                AuthError::Internal(anyhow::Error::new(e).context("password verification failed"))
            })?;
        if !matches {
            warn!(principal_id = principal.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let access_token = self.mint(&ClaimSet::access(&principal, &self.policy, now))?;
        let refresh_token = self.mint(&ClaimSet::refresh(&principal, &self.policy, now))?;

        with_deadline(self.store_timeout, "commit", tx.commit())
            .await
            .map_err(|e| {
                AuthError::Internal(anyhow::Error::new(e).context("login unit of work not committed"))
            })?;

        info!(principal_id = principal.id, "Login succeeded");
        Ok(LoginOutcome {
            user: PrincipalView::from(&principal),
            access_token,
            refresh_token,
        })
    }
}

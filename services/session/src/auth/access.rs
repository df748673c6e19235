use super::{log_internal, AuthService};
use crate::error::AuthError;
use crate::jwt::TokenType;
use crate::metrics;
use crate::principal::{AuthenticatedIdentity, PrincipalView};
use crate::store::with_deadline;
use tracing::{debug, warn};

impl AuthService {
    /// Check an access token and return the identity it carries.
    ///
    /// Pure computation. No store access.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidAccessToken`] if the token does not
    /// verify or is not an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let Ok(claims) = self.codec.verify(token) else {
            metrics::record_token_verification(TokenType::Access.as_str(), "invalid");
            warn!("Access token rejected: did not verify");
            return Err(AuthError::InvalidAccessToken);
        };

        if !claims.is_kind(TokenType::Access) {
            metrics::record_token_verification(TokenType::Access.as_str(), "wrong_kind");
            warn!(
                principal_id = claims.subject,
                token_type = %claims.token_type,
                "Access token rejected: wrong token kind"
            );
            return Err(AuthError::InvalidAccessToken);
        }

        metrics::record_token_verification(TokenType::Access.as_str(), "valid");
        debug!(principal_id = claims.subject, "Access token accepted");
        Ok(AuthenticatedIdentity {
            principal_id: claims.subject,
        })
    }

    /// Resolve the principal behind an authenticated request.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidAccessToken`] if the principal was deleted
    ///   after the token was issued
    /// - [`AuthError::Internal`] for store failures
    pub async fn current_principal(
        &self,
        identity: AuthenticatedIdentity,
    ) -> Result<PrincipalView, AuthError> {
        let result = with_deadline(
            self.store_timeout,
            "find_by_id",
            self.store.find_by_id(identity.principal_id),
        )
        .await
        .map_err(AuthError::from)
        .and_then(|found| {
            found.map(|p| PrincipalView::from(&p)).ok_or_else(|| {
                warn!(
                    principal_id = identity.principal_id,
                    "Access token rejected: principal no longer exists"
                );
                AuthError::InvalidAccessToken
            })
        });

        if let Err(e) = &result {
            log_internal("current_principal", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::AuthService;
    use crate::config::{JwtSecret, TokenPolicy};
    use crate::error::AuthError;
    use crate::jwt::{ClaimSet, TokenCodec, TokenType};
    use crate::password::BcryptVerifier;
    use crate::principal::{AuthenticatedIdentity, Principal};
    use crate::store::InMemoryCredentialStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn principal() -> Principal {
        let now = Utc::now();
        Principal {
            id: 5,
            email: "erin@mail.com".to_string(),
            secret_hash: String::new(),
            display_name: "Erin".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(store: InMemoryCredentialStore) -> AuthService {
        AuthService::new(
            Arc::new(store),
            Arc::new(BcryptVerifier),
            TokenCodec::new(&JwtSecret::new("unit-test-secret").unwrap()),
            TokenPolicy::default(),
        )
    }

    #[test]
    fn test_access_token_accepted() {
        let service = service(InMemoryCredentialStore::new());
        let token = service
            .codec()
            .mint(&ClaimSet::access(&principal(), service.policy(), Utc::now()))
            .unwrap();

        let identity = service.verify_access_token(&token).unwrap();
        assert_eq!(identity, AuthenticatedIdentity { principal_id: 5 });
    }

    #[test]
    fn test_refresh_token_rejected() {
        let service = service(InMemoryCredentialStore::new());
        let token = service
            .codec()
            .mint(&ClaimSet::refresh(&principal(), service.policy(), Utc::now()))
            .unwrap();

        assert!(matches!(
            service.verify_access_token(&token),
            Err(AuthError::InvalidAccessToken)
        ));
    }

    #[tokio::test]
    async fn test_current_principal() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal()).await.unwrap();
        let service = service(store.clone());
        let identity = AuthenticatedIdentity { principal_id: 5 };

        assert_eq!(service.current_principal(identity).await.unwrap().name, "Erin");

        store.remove(5).await.unwrap();
        assert!(matches!(
            service.current_principal(identity).await,
            Err(AuthError::InvalidAccessToken)
        ));
    }
}

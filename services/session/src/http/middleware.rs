//! Bearer access-token middleware.

use super::AppState;
use crate::error::AuthError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The header must be exactly two space-separated parts with the scheme
/// `Bearer`. Anything else yields `None`.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Reject requests without a valid access token, and attach the
/// [`AuthenticatedIdentity`](crate::principal::AuthenticatedIdentity) to
/// the rest.
pub async fn require_access_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = match bearer_token(request.headers()) {
        Some(token) => state.auth.verify_access_token(token),
        None => {
            warn!("Access token rejected: missing or malformed authorization header");
            Err(AuthError::InvalidAccessToken)
        }
    };

    match verified {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

//! Route handlers for the session API.

use super::response::WebResponse;
use super::AppState;
use crate::error::AuthError;
use crate::metrics;
use crate::principal::{
    AuthenticatedIdentity, LoginOutcome, LoginRequest, PrincipalView, RefreshOutcome,
    RefreshRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::{json, Value};
use tracing::{debug, error};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(inner)| inner).map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Request body rejected");
        AuthError::validation("invalid request body")
    })
}

/// `POST /api/session`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<WebResponse<LoginOutcome>, AuthError> {
    let request = body(payload)?;
    state.auth.login(&request).await.map(WebResponse::new)
}

/// `POST /api/session/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<WebResponse<RefreshOutcome>, AuthError> {
    let request = body(payload)?;
    state
        .auth
        .refresh(&request.refresh_token)
        .await
        .map(WebResponse::new)
}

/// `GET /api/users/_current`
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<WebResponse<PrincipalView>, AuthError> {
    state
        .auth
        .current_principal(identity)
        .await
        .map(WebResponse::new)
}

/// `GET /health`
pub async fn health() -> WebResponse<Value> {
    WebResponse::new(json!({ "status": "healthy" }))
}

/// `GET /metrics`
pub async fn prometheus_metrics() -> Response {
    match metrics::render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

//! Success envelope and error responses.

use crate::error::{AuthError, ErrorResponse};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Success envelope: `{ "ok": true, "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebResponse<T> {
    /// Always `true`
    pub ok: bool,
    /// Payload
    pub data: T,
}

impl<T> WebResponse<T> {
    /// Wrap a payload.
    pub const fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

impl<T: Serialize> IntoResponse for WebResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code().http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}

//! HTTP boundary.
//!
//! Thin axum layer over [`AuthService`]: decode the body, call the core,
//! wrap the result in the `{ok, data}` or `{ok, err, msg}` envelope.

pub mod handlers;
pub mod middleware;
pub mod response;

pub use response::WebResponse;

use crate::auth::AuthService;
use axum::extract::Request;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Request id header, generated when the caller does not send one.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Authentication core
    pub auth: AuthService,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub const fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

/// Build the service router with tracing and request-id layers.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users/_current", get(handlers::current_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_access_token,
        ));

    Router::new()
        .route("/api/session", post(handlers::login))
        .route("/api/session/refresh", post(handlers::refresh))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

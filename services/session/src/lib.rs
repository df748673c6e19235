//! Session Service library.
//!
//! Provides email/password login, JWT access and refresh token issuance,
//! refresh exchange and access-token verification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod jwt;
pub mod metrics;
pub mod password;
pub mod principal;
pub mod store;

// Re-exports for convenience
pub use auth::AuthService;
pub use config::Config;
pub use error::{AuthError, ErrorCode, ErrorResponse, TokenError};

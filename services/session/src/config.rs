//! Centralized configuration for Session Service.
//!
//! All configuration is loaded from environment variables and validated
//! at startup. Any failure here is fatal.

use rust_common::LogFormat;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

/// Secrets shorter than this are accepted but logged as weak.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable
    #[error("Invalid {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Shared HMAC secret. Wiped on drop and never printed.
#[derive(Clone)]
pub struct JwtSecret(Zeroizing<Vec<u8>>);

impl JwtSecret {
    /// Wrap secret bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(ConfigError::invalid("JWT_SECRET", "must not be empty"));
        }
        Ok(Self(bytes))
    }

    /// Raw key material.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Whether the secret is shorter than [`RECOMMENDED_SECRET_LEN`].
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.0.len() < RECOMMENDED_SECRET_LEN
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JwtSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// Token lifetimes. Access tokens always expire before refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenPolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < access_ttl < refresh_ttl` at whole-second
    /// resolution.
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, ConfigError> {
        if access_ttl.as_secs() == 0 {
            return Err(ConfigError::invalid("ACCESS_TOKEN_TTL", "must be at least 1 second"));
        }
        if refresh_ttl.as_secs() == 0 {
            return Err(ConfigError::invalid("REFRESH_TOKEN_TTL", "must be at least 1 second"));
        }
        if access_ttl.as_secs() >= refresh_ttl.as_secs() {
            return Err(ConfigError::invalid(
                "ACCESS_TOKEN_TTL",
                "must be shorter than REFRESH_TOKEN_TTL",
            ));
        }
        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    /// Access-token lifetime.
    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh-token lifetime.
    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(20),
            refresh_ttl: Duration::from_secs(86_400),
        }
    }
}

/// Session Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    // Token settings
    /// HMAC signing secret
    pub jwt_secret: JwtSecret,
    /// Token lifetimes
    pub token_policy: TokenPolicy,

    // Store settings
    /// Deadline for each credential store call
    pub store_timeout: Duration,
    /// Optional JSON file of principals to seed the store with
    pub principals_file: Option<PathBuf>,

    // Logging
    /// Default tracing filter
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 8080)?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or(ConfigError::Missing("JWT_SECRET"))
            .and_then(JwtSecret::new)?;

        let token_policy = TokenPolicy::new(
            Duration::from_secs(parse_var(&lookup, "ACCESS_TOKEN_TTL", 20)?),
            Duration::from_secs(parse_var(&lookup, "REFRESH_TOKEN_TTL", 86_400)?),
        )?;

        let store_timeout_ms: u64 = parse_var(&lookup, "STORE_TIMEOUT_MS", 2000)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::invalid("STORE_TIMEOUT_MS", "must be positive"));
        }

        let principals_file = lookup("PRINCIPALS_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = match lookup("LOG_FORMAT") {
            Some(name) => LogFormat::parse(&name)
                .ok_or_else(|| ConfigError::invalid("LOG_FORMAT", format!("unknown format {name:?}")))?,
            None => LogFormat::Json,
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_policy,
            store_timeout: Duration::from_millis(store_timeout_ms),
            principals_file,
            log_level,
            log_format,
        })
    }

    /// Socket address string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(name, format!("{e}"))),
        None => Ok(default),
    }
}

//! Prometheus metrics for Session Service.
//!
//! Provides counters and histograms for observability.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Login attempts counter.
pub static LOGIN_ATTEMPTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_login_attempts_total",
        "Total number of login attempts",
        &["outcome"]
    )
    .expect("Failed to register login_attempts metric")
});

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_tokens_issued_total",
        "Total number of tokens issued",
        &["token_type"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Tokens refreshed counter.
pub static TOKENS_REFRESHED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_tokens_refreshed_total",
        "Total number of refresh attempts",
        &["status"]
    )
    .expect("Failed to register tokens_refreshed metric")
});

/// Token verifications counter.
pub static TOKEN_VERIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_service_token_verifications_total",
        "Total number of token verifications",
        &["token_type", "status"]
    )
    .expect("Failed to register token_verifications metric")
});

/// Credential store call latency histogram.
pub static STORE_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "session_service_store_latency_seconds",
        "Credential store call latency in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register store_latency metric")
});

/// Record a login attempt.
pub fn record_login_attempt(outcome: &str) {
    LOGIN_ATTEMPTS.with_label_values(&[outcome]).inc();
}

/// Record a token issuance.
pub fn record_token_issued(token_type: &str) {
    TOKENS_ISSUED.with_label_values(&[token_type]).inc();
}

/// Record a refresh attempt.
pub fn record_token_refreshed(status: &str) {
    TOKENS_REFRESHED.with_label_values(&[status]).inc();
}

/// Record a token verification.
pub fn record_token_verification(token_type: &str, status: &str) {
    TOKEN_VERIFICATIONS
        .with_label_values(&[token_type, status])
        .inc();
}

/// Record credential store latency.
pub fn record_store_latency(operation: &str, duration_secs: f64) {
    STORE_LATENCY
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Render every registered metric in the Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

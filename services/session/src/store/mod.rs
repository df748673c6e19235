//! Credential store interface.
//!
//! The authentication core only ever reads principals. Reads that must
//! agree with each other go through a [`ReadTransaction`], which sees one
//! consistent snapshot until it is committed or dropped.

pub mod memory;

pub use memory::InMemoryCredentialStore;

use crate::metrics;
use crate::principal::Principal;
use async_trait::async_trait;
use rust_common::{PlatformError, PlatformResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Lookup capability over principal records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Principal with this exact email, if any.
    async fn find_by_email(&self, email: &str) -> PlatformResult<Option<Principal>>;

    /// Principal with this id, if any.
    async fn find_by_id(&self, id: i64) -> PlatformResult<Option<Principal>>;

    /// Start a read-consistent unit of work.
    async fn begin_read(&self) -> PlatformResult<Box<dyn ReadTransaction>>;
}

/// A read-only unit of work. Dropping it without [`commit`] aborts it.
///
/// [`commit`]: ReadTransaction::commit
#[async_trait]
pub trait ReadTransaction: Send {
    /// Principal with this exact email, as of the snapshot.
    async fn find_by_email(&mut self, email: &str) -> PlatformResult<Option<Principal>>;

    /// Principal with this id, as of the snapshot.
    async fn find_by_id(&mut self, id: i64) -> PlatformResult<Option<Principal>>;

    /// Finalize the unit of work.
    async fn commit(self: Box<Self>) -> PlatformResult<()>;
}

/// Run a store call under a deadline and record its latency.
///
/// # Errors
///
/// Returns the call's own error, or [`PlatformError::Timeout`] if it did
/// not finish within `timeout`.
pub async fn with_deadline<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> PlatformResult<T>
where
    F: Future<Output = PlatformResult<T>>,
{
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, call).await;
    metrics::record_store_latency(operation, started.elapsed().as_secs_f64());

    match result {
        Ok(inner) => inner,
        Err(_) => Err(PlatformError::timeout(operation, timeout)),
    }
}

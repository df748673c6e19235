//! Shared test doubles for the session service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_common::{PlatformError, PlatformResult};
use session_service::config::{JwtSecret, TokenPolicy};
use session_service::events::{EventPublisher, PrincipalEvent, PublishError};
use session_service::jwt::TokenCodec;
use session_service::password::{PasswordError, PasswordVerifier};
use session_service::principal::Principal;
use session_service::store::{CredentialStore, InMemoryCredentialStore, ReadTransaction};
use session_service::AuthService;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::fixtures::{SamplePrincipal, TEST_JWT_SECRET};

/// Store deadline used by tests that inject delays.
pub const TEST_STORE_TIMEOUT: Duration = Duration::from_millis(100);

/// Failure switches for [`MockCredentialStore`].
#[derive(Debug, Default)]
pub struct Faults {
    fail_begin: AtomicBool,
    fail_commit: AtomicBool,
    fail_lookup: AtomicBool,
    delay_ms: AtomicU64,
}

/// Call counters for [`MockCredentialStore`].
#[derive(Debug, Default)]
pub struct Stats {
    pub begun: AtomicUsize,
    pub committed: AtomicUsize,
    pub aborted: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl Stats {
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

/// In-memory store with failure injection and call counting.
pub struct MockCredentialStore {
    inner: InMemoryCredentialStore,
    faults: Arc<Faults>,
    stats: Arc<Stats>,
}

impl MockCredentialStore {
    pub fn new(inner: InMemoryCredentialStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            faults: Arc::new(Faults::default()),
            stats: Arc::new(Stats::default()),
        })
    }

    pub fn inner(&self) -> &InMemoryCredentialStore {
        &self.inner
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn fail_begin(&self, on: bool) {
        self.faults.fail_begin.store(on, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, on: bool) {
        self.faults.fail_commit.store(on, Ordering::SeqCst);
    }

    pub fn fail_lookup(&self, on: bool) {
        self.faults.fail_lookup.store(on, Ordering::SeqCst);
    }

    pub fn delay_lookups(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.faults.delay_ms.store(millis, Ordering::SeqCst);
    }
}

async fn before_lookup(faults: &Faults, stats: &Stats) -> PlatformResult<()> {
    stats.lookups.fetch_add(1, Ordering::SeqCst);
    let delay = faults.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if faults.fail_lookup.load(Ordering::SeqCst) {
        return Err(PlatformError::unavailable("db-primary.internal:5432 connection refused"));
    }
    Ok(())
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn find_by_email(&self, email: &str) -> PlatformResult<Option<Principal>> {
        before_lookup(&self.faults, &self.stats).await?;
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> PlatformResult<Option<Principal>> {
        before_lookup(&self.faults, &self.stats).await?;
        self.inner.find_by_id(id).await
    }

    async fn begin_read(&self) -> PlatformResult<Box<dyn ReadTransaction>> {
        if self.faults.fail_begin.load(Ordering::SeqCst) {
            return Err(PlatformError::transaction("pool exhausted"));
        }
        let inner = self.inner.begin_read().await?;
        self.stats.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransaction {
            inner: Some(inner),
            faults: Arc::clone(&self.faults),
            stats: Arc::clone(&self.stats),
            committed: false,
        }))
    }
}

struct MockTransaction {
    inner: Option<Box<dyn ReadTransaction>>,
    faults: Arc<Faults>,
    stats: Arc<Stats>,
    committed: bool,
}

impl MockTransaction {
    fn inner(&mut self) -> PlatformResult<&mut Box<dyn ReadTransaction>> {
        self.inner
            .as_mut()
            .ok_or_else(|| PlatformError::transaction("transaction already finished"))
    }
}

#[async_trait]
impl ReadTransaction for MockTransaction {
    async fn find_by_email(&mut self, email: &str) -> PlatformResult<Option<Principal>> {
        before_lookup(&self.faults, &self.stats).await?;
        self.inner()?.find_by_email(email).await
    }

    async fn find_by_id(&mut self, id: i64) -> PlatformResult<Option<Principal>> {
        before_lookup(&self.faults, &self.stats).await?;
        self.inner()?.find_by_id(id).await
    }

    async fn commit(self: Box<Self>) -> PlatformResult<()> {
        let mut this = self;
        if this.faults.fail_commit.load(Ordering::SeqCst) {
            return Err(PlatformError::transaction("serialization failure on commit"));
        }
        let inner = this
            .inner
            .take()
            .ok_or_else(|| PlatformError::transaction("transaction already finished"))?;
        inner.commit().await?;
        this.committed = true;
        this.stats.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockTransaction {
    fn drop(&mut self) {
        if !self.committed {
            self.stats.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Verifier that compares against `plain:<password>` hashes.
#[derive(Debug, Default)]
pub struct PlaintextVerifier {
    calls: AtomicUsize,
}

impl PlaintextVerifier {
    pub fn hash(password: &str) -> String {
        format!("plain:{password}")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordVerifier for PlaintextVerifier {
    async fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, PasswordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match hash.strip_prefix("plain:") {
            Some(expected) => Ok(expected == plaintext),
            None => Err(PasswordError::Bcrypt(bcrypt::BcryptError::InvalidHash(
                hash.to_string(),
            ))),
        }
    }
}

/// Publisher that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<PrincipalEvent>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn events(&self) -> Vec<PrincipalEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &PrincipalEvent) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::ChannelClosed);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Build a stored principal from a fixture, hashed for [`PlaintextVerifier`].
pub fn principal(sample: &SamplePrincipal) -> Principal {
    Principal {
        id: sample.id,
        email: sample.email.clone(),
        secret_hash: PlaintextVerifier::hash(&sample.password),
        display_name: sample.name.clone(),
        created_at: sample.created_at,
        updated_at: sample.updated_at,
    }
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(&JwtSecret::new(TEST_JWT_SECRET).unwrap())
}

/// Service over `store` with the plaintext verifier and default lifetimes.
pub fn service(store: Arc<dyn CredentialStore>) -> AuthService {
    AuthService::new(
        store,
        Arc::new(PlaintextVerifier::default()),
        test_codec(),
        TokenPolicy::default(),
    )
    .with_store_timeout(TEST_STORE_TIMEOUT)
}

/// A mock store seeded with the given fixtures, plus a service over it.
pub async fn seeded(samples: &[SamplePrincipal]) -> (Arc<MockCredentialStore>, AuthService) {
    let inner = InMemoryCredentialStore::new();
    for sample in samples {
        inner.insert(principal(sample)).await.unwrap();
    }
    let mock = MockCredentialStore::new(inner);
    let service = service(Arc::clone(&mock) as Arc<dyn CredentialStore>);
    (mock, service)
}

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

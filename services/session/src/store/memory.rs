//! In-process credential store.
//!
//! A single `RwLock` guards the whole table. A read transaction holds an
//! owned read guard, so admin writes wait until it commits or aborts.

use super::{CredentialStore, ReadTransaction};
use crate::events::{EventPublisher, PrincipalEvent, PrincipalEventKind};
use crate::principal::Principal;
use async_trait::async_trait;
use rust_common::{PlatformError, PlatformResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Table {
    by_id: HashMap<i64, Principal>,
    id_by_email: HashMap<String, i64>,
}

impl Table {
    fn find_by_email(&self, email: &str) -> Option<Principal> {
        self.id_by_email
            .get(email)
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    fn find_by_id(&self, id: i64) -> Option<Principal> {
        self.by_id.get(&id).cloned()
    }
}

/// Credential store backed by an in-memory table.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    table: Arc<RwLock<Table>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store with no event publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish lifecycle events for admin mutations.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_id.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Add a principal.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidInput`] if the id or email is taken.
    pub async fn insert(&self, principal: Principal) -> PlatformResult<()> {
        {
            let mut table = self.table.write().await;
            if table.by_id.contains_key(&principal.id) {
                return Err(PlatformError::invalid_input(format!(
                    "principal {} already exists",
                    principal.id
                )));
            }
            if table.id_by_email.contains_key(&principal.email) {
                return Err(PlatformError::invalid_input("email already registered"));
            }
            table.id_by_email.insert(principal.email.clone(), principal.id);
            table.by_id.insert(principal.id, principal.clone());
        }

        debug!(principal_id = principal.id, "Principal inserted");
        self.publish(PrincipalEventKind::Created, &principal).await;
        Ok(())
    }

    /// Replace an existing principal, matched by id.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] if no principal has this id, or
    /// [`PlatformError::InvalidInput`] if the new email belongs to another
    /// principal.
    pub async fn update(&self, principal: Principal) -> PlatformResult<()> {
        {
            let mut table = self.table.write().await;
            let previous_email = match table.by_id.get(&principal.id) {
                Some(existing) => existing.email.clone(),
                None => return Err(PlatformError::NotFound(format!("principal {}", principal.id))),
            };
            if previous_email != principal.email {
                if table.id_by_email.contains_key(&principal.email) {
                    return Err(PlatformError::invalid_input("email already registered"));
                }
                table.id_by_email.remove(&previous_email);
                table.id_by_email.insert(principal.email.clone(), principal.id);
            }
            table.by_id.insert(principal.id, principal.clone());
        }

        debug!(principal_id = principal.id, "Principal updated");
        self.publish(PrincipalEventKind::Updated, &principal).await;
        Ok(())
    }

    /// Remove a principal by id, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] if no principal has this id.
    pub async fn remove(&self, id: i64) -> PlatformResult<Principal> {
        let removed = {
            let mut table = self.table.write().await;
            let removed = table
                .by_id
                .remove(&id)
                .ok_or_else(|| PlatformError::NotFound(format!("principal {id}")))?;
            table.id_by_email.remove(&removed.email);
            removed
        };

        debug!(principal_id = id, "Principal removed");
        self.publish(PrincipalEventKind::Deleted, &removed).await;
        Ok(removed)
    }

    /// Load principals from a JSON array file, returning how many were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any
    /// record collides with an existing one.
    pub async fn load_json(&self, path: impl AsRef<Path>) -> PlatformResult<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        let principals: Vec<Principal> = serde_json::from_slice(&raw)?;
        let count = principals.len();

        for principal in principals {
            self.insert(principal).await?;
        }

        info!(path = %path.display(), count, "Principals loaded");
        Ok(count)
    }

    async fn publish(&self, kind: PrincipalEventKind, principal: &Principal) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        let event = PrincipalEvent::new(kind, principal);
        if let Err(e) = publisher.publish(&event).await {
            warn!(
                principal_id = principal.id,
                kind = kind.as_str(),
                error = %e,
                "Failed to publish principal event"
            );
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> PlatformResult<Option<Principal>> {
        Ok(self.table.read().await.find_by_email(email))
    }

    async fn find_by_id(&self, id: i64) -> PlatformResult<Option<Principal>> {
        Ok(self.table.read().await.find_by_id(id))
    }

    async fn begin_read(&self) -> PlatformResult<Box<dyn ReadTransaction>> {
        let snapshot = Arc::clone(&self.table).read_owned().await;
        Ok(Box::new(MemoryReadTransaction { snapshot }))
    }
}

struct MemoryReadTransaction {
    snapshot: OwnedRwLockReadGuard<Table>,
}

#[async_trait]
impl ReadTransaction for MemoryReadTransaction {
    async fn find_by_email(&mut self, email: &str) -> PlatformResult<Option<Principal>> {
        Ok(self.snapshot.find_by_email(email))
    }

    async fn find_by_id(&mut self, id: i64) -> PlatformResult<Option<Principal>> {
        Ok(self.snapshot.find_by_id(id))
    }

    async fn commit(self: Box<Self>) -> PlatformResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChannelPublisher;
    use chrono::Utc;
    use std::time::Duration;

    fn principal(id: i64, email: &str) -> Principal {
        let now = Utc::now();
        Principal {
            id,
            email: email.to_string(),
            secret_hash: "$2b$04$hash".to_string(),
            display_name: format!("User {id}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();

        let by_email = store.find_by_email("alice@mail.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, 1);
        assert_eq!(store.find_by_id(1).await.unwrap().unwrap().email, "alice@mail.com");
        assert!(store.find_by_email("ALICE@mail.com").await.unwrap().is_none());
        assert!(store.find_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();

        assert!(store.insert(principal(1, "other@mail.com")).await.is_err());
        assert!(store.insert(principal(2, "alice@mail.com")).await.is_err());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_moves_email_index() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();
        store.update(principal(1, "alice@new.com")).await.unwrap();

        assert!(store.find_by_email("alice@mail.com").await.unwrap().is_none());
        assert_eq!(store.find_by_email("alice@new.com").await.unwrap().unwrap().id, 1);
        assert!(matches!(
            store.update(principal(9, "x@mail.com")).await,
            Err(PlatformError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();

        assert_eq!(store.remove(1).await.unwrap().id, 1);
        assert!(store.is_empty().await);
        assert!(store.find_by_email("alice@mail.com").await.unwrap().is_none());
        assert!(store.remove(1).await.is_err());
    }

    #[tokio::test]
    async fn test_transaction_sees_one_snapshot() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();

        let mut tx = store.begin_read().await.unwrap();
        let first = tx.find_by_email("alice@mail.com").await.unwrap().unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut changed = principal(1, "alice@mail.com");
                changed.secret_hash = "$2b$04$changed".to_string();
                store.update(changed).await
            })
        };

        // The writer cannot land while the snapshot is held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = tx.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert!(!writer.is_finished());

        tx.commit().await.unwrap();
        writer.await.unwrap().unwrap();
        let after = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(after.secret_hash, "$2b$04$changed");
    }

    #[tokio::test]
    async fn test_dropped_transaction_releases_snapshot() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, "alice@mail.com")).await.unwrap();

        let tx = store.begin_read().await.unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), store.remove(1))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let (publisher, mut events) = ChannelPublisher::new(8);
        let store = InMemoryCredentialStore::new().with_publisher(Arc::new(publisher));

        store.insert(principal(1, "alice@mail.com")).await.unwrap();
        store.update(principal(1, "alice@mail.com")).await.unwrap();
        store.remove(1).await.unwrap();

        let kinds: Vec<_> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.kind)
        .collect();
        assert_eq!(
            kinds,
            vec![
                PrincipalEventKind::Created,
                PrincipalEventKind::Updated,
                PrincipalEventKind::Deleted
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_mutation() {
        let (publisher, events) = ChannelPublisher::new(1);
        drop(events);
        let store = InMemoryCredentialStore::new().with_publisher(Arc::new(publisher));

        assert!(store.insert(principal(1, "alice@mail.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_load_json() {
        let path = std::env::temp_dir().join(format!("principals-{}.json", std::process::id()));
        let records = vec![principal(1, "alice@mail.com"), principal(2, "bob@mail.com")];
        tokio::fs::write(&path, serde_json::to_vec(&records).unwrap())
            .await
            .unwrap();

        let store = InMemoryCredentialStore::new();
        assert_eq!(store.load_json(&path).await.unwrap(), 2);
        assert_eq!(store.find_by_email("bob@mail.com").await.unwrap().unwrap().id, 2);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_json_rejects_bad_file() {
        let store = InMemoryCredentialStore::new();
        assert!(matches!(
            store.load_json("/nonexistent/principals.json").await,
            Err(PlatformError::Io(_))
        ));
    }
}

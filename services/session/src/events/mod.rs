//! Principal lifecycle events.
//!
//! Publication is best-effort. A failed publish is logged by the caller
//! and never fails the operation that produced the event.

use crate::principal::Principal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Topic name principal events are published under.
pub const PRINCIPAL_TOPIC: &str = "users";

/// What happened to the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalEventKind {
    /// Newly inserted
    Created,
    /// Changed in place
    Updated,
    /// Removed
    Deleted,
}

impl PrincipalEventKind {
    /// Label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Event payload. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalEvent {
    /// Principal id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
    /// Last update time, epoch milliseconds
    pub updated_at: i64,
    /// Change kind
    pub kind: PrincipalEventKind,
}

impl PrincipalEvent {
    /// Build an event describing `principal`.
    #[must_use]
    pub fn new(kind: PrincipalEventKind, principal: &Principal) -> Self {
        Self {
            id: principal.id,
            name: principal.display_name.clone(),
            created_at: principal.created_at.timestamp_millis(),
            updated_at: principal.updated_at.timestamp_millis(),
            kind,
        }
    }

    /// Partition key.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Publication failures.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Downstream buffer is full
    #[error("Event channel is full")]
    ChannelFull,

    /// Downstream consumer has gone away
    #[error("Event channel is closed")]
    ChannelClosed,

    /// Payload could not be encoded
    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sink for principal events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event without waiting on the consumer.
    async fn publish(&self, event: &PrincipalEvent) -> Result<(), PublishError>;
}

/// Writes each event as a structured log record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &PrincipalEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        info!(
            topic = PRINCIPAL_TOPIC,
            key = %event.key(),
            kind = event.kind.as_str(),
            payload = %payload,
            "Principal event published"
        );
        Ok(())
    }
}

/// Forwards events into a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<PrincipalEvent>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PrincipalEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: &PrincipalEvent) -> Result<(), PublishError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PublishError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => PublishError::ChannelClosed,
        })
    }
}

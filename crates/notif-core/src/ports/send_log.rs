//! Send log port - persistence for the rate limiter's history.

use async_trait::async_trait;

use crate::domain::SendLog;

/// A change applied to the send log under the store's exclusive lock.
pub type SendLogMutation = Box<dyn FnOnce(&mut SendLog) + Send>;

/// Send log store - abstraction over where the history document lives
/// (flat file, in-memory).
///
/// Every call works on the whole document; implementations keep no cache
/// between calls.
#[async_trait]
pub trait SendLogStore: Send + Sync {
    /// Read the full document. A missing store is an empty document.
    async fn load(&self) -> Result<SendLog, StoreError>;

    /// Replace the full document.
    async fn save(&self, log: &SendLog) -> Result<(), StoreError>;

    /// Read, mutate and write back while holding the exclusive lock, so that
    /// concurrent updates are never lost.
    async fn update(&self, mutation: SendLogMutation) -> Result<(), StoreError>;
}

/// Send log store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read send log: {0}")]
    Read(String),

    #[error("Failed to write send log: {0}")]
    Write(String),

    #[error("Failed to encode send log: {0}")]
    Encode(String),
}

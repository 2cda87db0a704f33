//! In-memory send log - used in tests and when no log path is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use notif_core::domain::SendLog;
use notif_core::ports::{SendLogMutation, SendLogStore, StoreError};

/// In-memory send log using an async RwLock.
///
/// Note: History is lost on process restart.
#[derive(Default)]
pub struct InMemorySendLog {
    log: RwLock<SendLog>,
}

impl InMemorySendLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_log(log: SendLog) -> Self {
        Self {
            log: RwLock::new(log),
        }
    }
}

#[async_trait]
impl SendLogStore for InMemorySendLog {
    async fn load(&self) -> Result<SendLog, StoreError> {
        Ok(self.log.read().await.clone())
    }

    async fn save(&self, log: &SendLog) -> Result<(), StoreError> {
        *self.log.write().await = log.clone();
        Ok(())
    }

    async fn update(&self, mutation: SendLogMutation) -> Result<(), StoreError> {
        let mut log = self.log.write().await;
        mutation(&mut *log);
        Ok(())
    }
}

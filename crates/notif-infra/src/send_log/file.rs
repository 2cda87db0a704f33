//! Flat-file send log - one pretty-printed JSON document on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use notif_core::domain::SendLog;
use notif_core::ports::{SendLogMutation, SendLogStore, StoreError};

/// Send log persisted as a single JSON file.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers always see a complete document. Writers are serialized
/// by an in-process lock; the file is not safe to share between processes.
pub struct JsonFileSendLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<SendLog, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SendLog::default()),
            Err(e) => return Err(StoreError::Read(e.to_string())),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(SendLog::default());
        }

        match serde_json::from_slice::<SendLog>(&raw) {
            Ok(log) => Ok(log),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Send log is corrupt, using an empty document"
                );
                Ok(SendLog::default())
            }
        }
    }

    async fn write_document(&self, log: &SendLog) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Write(format!("failed to create log directory: {e}")))?;
        }

        let payload =
            serde_json::to_vec_pretty(log).map_err(|e| StoreError::Encode(e.to_string()))?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Write(format!("failed to replace send log: {e}")));
        }

        Ok(())
    }
}

#[async_trait]
impl SendLogStore for JsonFileSendLog {
    async fn load(&self) -> Result<SendLog, StoreError> {
        self.read_document().await
    }

    async fn save(&self, log: &SendLog) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_document(log).await
    }

    async fn update(&self, mutation: SendLogMutation) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut log = self.read_document().await?;
        mutation(&mut log);
        self.write_document(&log).await?;

        tracing::debug!(path = %self.path.display(), senders = log.len(), "Send log written");
        Ok(())
    }
}

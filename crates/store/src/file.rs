//! Disk-backed store holding every record in one JSON document.

use crate::change::ChangeSubscription;
use crate::error::{Result, StoreError};
use crate::poller::spawn_request_poller;
use crate::DocumentStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillmatch_matching::{RequestRecord, RequestUpdate, UserRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// On-disk layout of a [`JsonFileStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub requests: Vec<RequestRecord>,
}

/// Store backed by a JSON file, re-read on every call.
///
/// The file may be edited by other processes between calls; changes are
/// picked up by polling.
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
    poll_interval: Duration,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
            poll_interval,
        }
    }

    /// Read the whole document; a missing file reads as empty.
    pub async fn read_document(&self) -> Result<StoreDocument> {
        let text = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::default())
            }
            Err(err) => return Err(StoreError::io(self.path.as_path(), err)),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.to_path_buf(),
            source,
        })
    }

    /// Replace the whole document atomically.
    pub async fn write_document(&self, document: &StoreDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(document).await
    }

    async fn persist(&self, document: &StoreDocument) -> Result<()> {
        let path = self.path.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io(parent, err))?;
        }
        let data = serde_json::to_string_pretty(document).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // Write to a temp file then rename so readers never see a partial file.
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|err| StoreError::io(&temp_path, err))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|err| StoreError::io(path, err))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.read_document().await?.users)
    }

    async fn list_requests(&self) -> Result<Vec<RequestRecord>> {
        Ok(self.read_document().await?.requests)
    }

    async fn update_request(&self, id: &str, update: &RequestUpdate) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let record = document
            .requests
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(update);
        self.persist(&document).await
    }

    async fn subscribe_request_changes(&self) -> Result<ChangeSubscription> {
        Ok(spawn_request_poller(self.clone(), self.poll_interval))
    }
}

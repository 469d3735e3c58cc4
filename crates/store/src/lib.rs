//! Document store access for skillmatch.
//!
//! The matcher only needs four things from a store: list users, list pending
//! requests, update one request, and a feed of request changes. Those are
//! captured by [`DocumentStore`]; backends are chosen at startup and passed
//! around as `Arc<dyn DocumentStore>`.
//!
//! Backends:
//! - [`MemoryStore`] keeps records in memory and pushes changes to subscribers.
//! - [`JsonFileStore`] keeps a single JSON document on disk.
//! - [`FirestoreStore`] talks to the Firestore REST API.
//!
//! Stores without push notifications get their change feed from
//! [`spawn_request_poller`].

#![deny(unsafe_code)]

pub mod change;
pub mod error;
pub mod file;
pub mod firestore;
pub mod memory;
pub mod poller;

pub use change::{ChangeEvent, ChangeKind, ChangeSubscription};
pub use error::{Result, StoreError};
pub use file::{JsonFileStore, StoreDocument};
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use poller::{diff_requests, spawn_request_poller};

use async_trait::async_trait;
use skillmatch_matching::{RequestRecord, RequestUpdate, UserRecord};

/// The document store collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend label used in logs.
    fn name(&self) -> &str;

    /// Fetch every user record.
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    /// Fetch every request record, whatever its status.
    async fn list_requests(&self) -> Result<Vec<RequestRecord>>;

    /// Fetch the request records whose status is `pending`.
    async fn list_pending_requests(&self) -> Result<Vec<RequestRecord>> {
        let mut requests = self.list_requests().await?;
        requests.retain(|record| record.status.is_pending());
        Ok(requests)
    }

    /// Write a processing result to one request.
    ///
    /// Fails with [`StoreError::NotFound`] when no request has this id.
    async fn update_request(&self, id: &str, update: &RequestUpdate) -> Result<()>;

    /// Subscribe to batches of request changes.
    async fn subscribe_request_changes(&self) -> Result<ChangeSubscription>;
}

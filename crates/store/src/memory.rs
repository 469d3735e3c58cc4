//! In-memory store for tests and ephemeral runs.

use crate::change::{ChangeEvent, ChangeSubscription};
use crate::error::{Result, StoreError};
use crate::DocumentStore;
use async_trait::async_trait;
use indexmap::IndexMap;
use skillmatch_matching::{RequestRecord, RequestUpdate, UserRecord};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Default)]
struct MemState {
    users: IndexMap<String, UserRecord>,
    requests: IndexMap<String, RequestRecord>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<ChangeEvent>>>,
    updates: usize,
}

impl MemState {
    fn publish(&mut self, batch: Vec<ChangeEvent>) {
        // Subscribers queue every batch until drained; closed ones are forgotten.
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
        if self.subscribers.len() < before {
            tracing::debug!(
                target: "skillmatch::store",
                remaining = self.subscribers.len(),
                "Dropped closed change subscribers"
            );
        }
    }
}

/// Records held in memory; every request write is pushed to subscribers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with records, without emitting changes.
    pub fn with_records(users: Vec<UserRecord>, requests: Vec<RequestRecord>) -> Self {
        let state = MemState {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            requests: requests.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..MemState::default()
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn insert_user(&self, user: UserRecord) {
        let mut guard = self.inner.lock().await;
        guard.users.insert(user.id.clone(), user);
    }

    /// Insert or replace a request and notify subscribers.
    pub async fn insert_request(&self, request: RequestRecord) {
        let mut guard = self.inner.lock().await;
        let id = request.id.clone();
        let event = if guard.requests.insert(id.clone(), request).is_some() {
            ChangeEvent::modified(id)
        } else {
            ChangeEvent::added(id)
        };
        guard.publish(vec![event]);
    }

    /// Remove a request and notify subscribers.
    pub async fn remove_request(&self, id: &str) -> Option<RequestRecord> {
        let mut guard = self.inner.lock().await;
        let removed = guard.requests.shift_remove(id);
        if removed.is_some() {
            guard.publish(vec![ChangeEvent::removed(id)]);
        }
        removed
    }

    pub async fn request(&self, id: &str) -> Option<RequestRecord> {
        let guard = self.inner.lock().await;
        guard.requests.get(id).cloned()
    }

    /// Number of `update_request` calls that succeeded.
    pub async fn update_count(&self) -> usize {
        self.inner.lock().await.updates
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let guard = self.inner.lock().await;
        Ok(guard.users.values().cloned().collect())
    }

    async fn list_requests(&self) -> Result<Vec<RequestRecord>> {
        let guard = self.inner.lock().await;
        Ok(guard.requests.values().cloned().collect())
    }

    async fn update_request(&self, id: &str, update: &RequestUpdate) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let record = guard
            .requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(update);
        guard.updates += 1;
        guard.publish(vec![ChangeEvent::modified(id)]);
        Ok(())
    }

    async fn subscribe_request_changes(&self) -> Result<ChangeSubscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().await.subscribers.push(tx);
        Ok(ChangeSubscription::unbounded(rx))
    }
}

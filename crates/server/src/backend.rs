//! Store selection from command-line and environment settings.

use crate::config::{
    ENV_FIRESTORE_BASE_URL, ENV_FIRESTORE_DATABASE, ENV_FIRESTORE_PROJECT, ENV_FIRESTORE_TOKEN,
    ENV_REQUESTS_COLLECTION, ENV_STORE_BACKEND, ENV_STORE_PATH, ENV_USERS_COLLECTION,
};
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use skillmatch_store::{DocumentStore, FirestoreConfig, FirestoreStore, JsonFileStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Available document store backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A JSON document on local disk.
    #[default]
    File,
    /// The Firestore REST API.
    Firestore,
    /// In-process memory, seeded from the store file when it exists.
    Memory,
}

/// Options choosing and configuring the document store.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Store backend.
    #[arg(long, global = true, env = ENV_STORE_BACKEND, value_enum, default_value_t = Backend::File)]
    pub backend: Backend,
    /// JSON store document (defaults to ~/.skillmatch/store.json).
    #[arg(long, global = true, env = ENV_STORE_PATH, value_name = "FILE")]
    pub store_path: Option<PathBuf>,
    /// Firestore project id.
    #[arg(long, global = true, env = ENV_FIRESTORE_PROJECT)]
    pub project_id: Option<String>,
    /// Firestore database id.
    #[arg(long, global = true, env = ENV_FIRESTORE_DATABASE)]
    pub database: Option<String>,
    /// Firestore API origin, e.g. an emulator.
    #[arg(long, global = true, env = ENV_FIRESTORE_BASE_URL, value_name = "URL")]
    pub base_url: Option<String>,
    /// Bearer token for Firestore.
    #[arg(long, global = true, env = ENV_FIRESTORE_TOKEN, hide_env_values = true)]
    pub token: Option<String>,
    /// Collection holding user documents.
    #[arg(long, global = true, env = ENV_USERS_COLLECTION)]
    pub users_collection: Option<String>,
    /// Collection holding request documents.
    #[arg(long, global = true, env = ENV_REQUESTS_COLLECTION)]
    pub requests_collection: Option<String>,
}

impl StoreArgs {
    /// Resolve the store document path, falling back to ~/.skillmatch/store.json.
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => default_store_path()
                .ok_or_else(|| anyhow!("cannot determine home directory; pass --store-path")),
        }
    }

    /// Firestore settings built from these options.
    pub fn firestore_config(&self, poll_interval: Duration) -> Result<FirestoreConfig> {
        let project_id = self
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("firestore backend needs --project-id or {ENV_FIRESTORE_PROJECT}")
            })?;
        let mut config = FirestoreConfig::new(project_id);
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(users) = &self.users_collection {
            config.users_collection = users.clone();
        }
        if let Some(requests) = &self.requests_collection {
            config.requests_collection = requests.clone();
        }
        config.token = self.token.clone();
        config.poll_interval = poll_interval;
        Ok(config)
    }

    /// Construct the selected store.
    pub async fn open(&self, poll_interval: Duration) -> Result<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = match self.backend {
            Backend::File => {
                let path = self.resolved_store_path()?;
                tracing::debug!(
                    target: "skillmatch::store",
                    path = %path.display(),
                    "Using JSON file store"
                );
                Arc::new(JsonFileStore::new(path, poll_interval))
            }
            Backend::Firestore => {
                let config = self.firestore_config(poll_interval)?;
                tracing::debug!(
                    target: "skillmatch::store",
                    project = %config.project_id,
                    database = %config.database,
                    "Using Firestore store"
                );
                Arc::new(FirestoreStore::new(config))
            }
            Backend::Memory => {
                let path = self.resolved_store_path()?;
                let seed = JsonFileStore::new(&path, poll_interval)
                    .read_document()
                    .await
                    .with_context(|| format!("failed to seed memory store from {}", path.display()))?;
                tracing::debug!(
                    target: "skillmatch::store",
                    users = seed.users.len(),
                    requests = seed.requests.len(),
                    "Using memory store"
                );
                Arc::new(MemoryStore::with_records(seed.users, seed.requests))
            }
        };
        Ok(store)
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".skillmatch").join("store.json"))
}

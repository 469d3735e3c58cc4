//! Configuration file support for skillmatch.
//!
//! Loads settings from `~/.skillmatch/config.toml` with the following precedence:
//! CLI arguments > Environment variables > Config file
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.skillmatch/config.toml
//!
//! [store]
//! # Backend: "file", "firestore" or "memory"
//! backend = "firestore"
//!
//! # JSON document used by the file backend (and to seed the memory backend)
//! path = "/var/lib/skillmatch/store.json"
//!
//! # Firestore connection
//! project_id = "my-project"
//! database = "(default)"
//! base_url = "https://firestore.googleapis.com"
//! token = "ya29..."
//! users_collection = "users"
//! requests_collection = "requests"
//!
//! [watch]
//! # How often polling backends look for request changes
//! poll_interval_ms = 2000
//!
//! # Which pending requests a change reprocesses: "all" or "changed"
//! reprocess = "all"
//! ```

use crate::trigger::ReprocessScope;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_STORE_BACKEND: &str = "SKILLMATCH_STORE_BACKEND";
pub const ENV_STORE_PATH: &str = "SKILLMATCH_STORE_PATH";
pub const ENV_FIRESTORE_PROJECT: &str = "SKILLMATCH_FIRESTORE_PROJECT";
pub const ENV_FIRESTORE_DATABASE: &str = "SKILLMATCH_FIRESTORE_DATABASE";
pub const ENV_FIRESTORE_BASE_URL: &str = "SKILLMATCH_FIRESTORE_BASE_URL";
pub const ENV_FIRESTORE_TOKEN: &str = "SKILLMATCH_FIRESTORE_TOKEN";
pub const ENV_USERS_COLLECTION: &str = "SKILLMATCH_USERS_COLLECTION";
pub const ENV_REQUESTS_COLLECTION: &str = "SKILLMATCH_REQUESTS_COLLECTION";
pub const ENV_POLL_INTERVAL_MS: &str = "SKILLMATCH_POLL_INTERVAL_MS";
pub const ENV_REPROCESS: &str = "SKILLMATCH_REPROCESS";

/// Top-level configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Document store selection and connection settings.
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// Backend name: `file`, `firestore` or `memory`.
    pub backend: Option<String>,
    /// Path of the JSON store document.
    pub path: Option<PathBuf>,
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub base_url: Option<String>,
    /// Bearer token for Firestore; passed through untouched.
    pub token: Option<String>,
    pub users_collection: Option<String>,
    pub requests_collection: Option<String>,
}

/// Settings for the watch daemon.
#[derive(Debug, Default, Deserialize)]
pub struct WatchConfig {
    pub poll_interval_ms: Option<u64>,
    pub reprocess: Option<ReprocessScope>,
}

/// Returns the path to the config file (~/.skillmatch/config.toml).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".skillmatch").join("config.toml"))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
/// fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_config_from(&path)
}

/// Loads a configuration file from an explicit location.
pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;

    tracing::debug!(
        target: "skillmatch::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Applies configuration file settings to environment variables.
///
/// Only sets environment variables that are not already set, preserving
/// the precedence: CLI > ENV > config file.
///
/// This should be called early in the application startup, before
/// parsing CLI arguments. A config file that fails to parse is reported
/// and otherwise ignored.
pub fn apply_config_to_env() {
    match load_config() {
        Ok(Some(config)) => apply_to_env(&config),
        Ok(None) => {}
        Err(err) => tracing::warn!(
            target: "skillmatch::config",
            error = ?err,
            "Ignoring configuration file"
        ),
    }
}

/// Exports every setting of `config` that the environment does not already carry.
pub fn apply_to_env(config: &Config) {
    let store = &config.store;
    if let Some(ref backend) = store.backend {
        set_if_absent(ENV_STORE_BACKEND, backend);
    }
    if let Some(ref path) = store.path {
        set_if_absent(ENV_STORE_PATH, &path.to_string_lossy());
    }
    if let Some(ref project) = store.project_id {
        set_if_absent(ENV_FIRESTORE_PROJECT, project);
    }
    if let Some(ref database) = store.database {
        set_if_absent(ENV_FIRESTORE_DATABASE, database);
    }
    if let Some(ref base_url) = store.base_url {
        set_if_absent(ENV_FIRESTORE_BASE_URL, base_url);
    }
    if let Some(ref token) = store.token {
        set_if_absent(ENV_FIRESTORE_TOKEN, token);
    }
    if let Some(ref users) = store.users_collection {
        set_if_absent(ENV_USERS_COLLECTION, users);
    }
    if let Some(ref requests) = store.requests_collection {
        set_if_absent(ENV_REQUESTS_COLLECTION, requests);
    }

    let watch = &config.watch;
    if let Some(interval) = watch.poll_interval_ms {
        set_if_absent(ENV_POLL_INTERVAL_MS, &interval.to_string());
    }
    if let Some(scope) = watch.reprocess {
        let value = match scope {
            ReprocessScope::All => "all",
            ReprocessScope::Changed => "changed",
        };
        set_if_absent(ENV_REPROCESS, value);
    }
}

fn set_if_absent(key: &str, value: &str) {
    if std::env::var(key).is_err() {
        std::env::set_var(key, value);
        tracing::trace!(
            target: "skillmatch::config",
            key,
            "Set environment variable from config file"
        );
    }
}

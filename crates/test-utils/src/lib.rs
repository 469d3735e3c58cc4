//! Shared test utilities for skillmatch crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the skillmatch workspace.

use skillmatch_matching::{RequestRecord, SkillEntry, UserRecord};
use std::path::{Path, PathBuf};

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = skillmatch_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Build a user whose skills are given as `(name, level)` pairs.
pub fn user(id: &str, skills: &[(&str, &str)]) -> UserRecord {
    UserRecord::new(
        id,
        skills
            .iter()
            .map(|(name, level)| SkillEntry::new(*name, *level))
            .collect(),
    )
}

/// Build a pending request from `requester`.
pub fn pending(id: &str, requester: &str, required: &[(&str, &str)]) -> RequestRecord {
    RequestRecord::pending(id, requester, required)
}

/// Temporary home directory with a `.skillmatch/` folder.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Path to ~/.skillmatch in the temp environment
    pub config_dir: PathBuf,
}

impl TestFixture {
    /// Create the fixture. Does NOT set HOME; use `home_guard()` for that.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let config_dir = tempdir.path().join(".skillmatch");
        std::fs::create_dir_all(&config_dir)?;
        Ok(Self {
            tempdir,
            config_dir,
        })
    }

    /// Get the path that should be set as HOME.
    pub fn home_path(&self) -> &Path {
        self.tempdir.path()
    }

    /// Create an RAII guard that sets HOME to this fixture's temp directory.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("HOME", Some(self.home_path().to_str().unwrap()))
    }

    /// Default location of the JSON store file.
    pub fn store_path(&self) -> PathBuf {
        self.config_dir.join("store.json")
    }

    /// Write `~/.skillmatch/config.toml`.
    pub fn write_config(&self, content: &str) -> std::io::Result<PathBuf> {
        let path = self.config_dir.join("config.toml");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a JSON store document holding the given records.
    pub fn write_store(
        &self,
        users: &[UserRecord],
        requests: &[RequestRecord],
    ) -> std::io::Result<PathBuf> {
        let path = self.store_path();
        let document = serde_json::json!({ "users": users, "requests": requests });
        std::fs::write(&path, serde_json::to_vec_pretty(&document)?)?;
        Ok(path)
    }

    /// Read the store document back as raw JSON.
    pub fn read_store(&self) -> std::io::Result<serde_json::Value> {
        let text = std::fs::read_to_string(self.store_path())?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_set_env_var_sets_and_restores() {

        const KEY: &str = "SKILLMATCH_TEST_UTILS_TEST_VAR";
        std::env::remove_var(KEY);

        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    #[serial]
    fn test_set_env_var_removes_when_none() {

        const KEY: &str = "SKILLMATCH_TEST_REMOVE_VAR";
        std::env::set_var(KEY, "exists");

        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("exists".to_string()));

        std::env::remove_var(KEY);
    }

    #[test]
    fn test_fixture_creates_config_dir() {
        let fixture = TestFixture::new().expect("fixture creation");
        assert!(fixture.config_dir.is_dir());
        assert!(fixture.store_path().starts_with(fixture.home_path()));
    }

    #[test]
    fn test_write_store_uses_wire_field_names() {
        let fixture = TestFixture::new().expect("fixture creation");
        fixture
            .write_store(
                &[user("u1", &[("Python", "Expert")])],
                &[pending("r1", "u2", &[("python", "expert")])],
            )
            .expect("write store");

        let doc = fixture.read_store().expect("read store");
        assert_eq!(doc["users"][0]["skills"][0]["name"], "Python");
        assert_eq!(doc["requests"][0]["userId"], "u2");
        assert_eq!(doc["requests"][0]["skillRequired"][0], "python");
        assert_eq!(doc["requests"][0]["status"], "pending");
    }
}

//! Record types exchanged with the document store.
//!
//! Field names follow the store's camelCase documents. Decoding is lenient:
//! a missing or wrongly-typed collection decodes as empty rather than failing
//! the whole run, so one malformed document never blocks the others.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A declared skill on a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: String,
}

impl SkillEntry {
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
        }
    }
}

/// A user document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Document identifier.
    #[serde(default)]
    pub id: String,
    /// Declared skills, raw (not normalized).
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<SkillEntry>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, skills: Vec<SkillEntry>) -> Self {
        Self {
            id: id.into(),
            skills,
        }
    }
}

/// Lifecycle status of a request document.
///
/// Unknown strings are preserved so that writing a record back never rewrites
/// a status this crate does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Processed,
    NoMatchFound,
    Other(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::NoMatchFound => "no match found",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for RequestStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "processed" => Self::Processed,
            "no match found" => Self::NoMatchFound,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self::from(raw.as_str()),
            _ => Self::default(),
        })
    }
}

/// A skill request document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Document identifier.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: RequestStatus,
    /// The user who created the request.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub user_id: Option<String>,
    /// Required skill names, paired by position with `skill_level_required`.
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skill_required: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skill_level_required: Vec<String>,
    /// Ranked candidates written by the last processing run.
    #[serde(default, deserialize_with = "lenient_strings")]
    pub returned_users: Vec<String>,
}

impl RequestRecord {
    /// Build a pending request from `(skill, level)` pairs.
    pub fn pending(
        id: impl Into<String>,
        requester: impl Into<String>,
        required: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.into(),
            status: RequestStatus::Pending,
            user_id: Some(requester.into()),
            skill_required: required.iter().map(|(s, _)| (*s).to_string()).collect(),
            skill_level_required: required.iter().map(|(_, l)| (*l).to_string()).collect(),
            returned_users: Vec::new(),
        }
    }

    /// Apply a processing result to this record.
    pub fn apply(&mut self, update: &RequestUpdate) {
        self.status = update.status.clone();
        self.returned_users = update.returned_users.clone();
    }
}

/// The write made for one processed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdate {
    pub returned_users: Vec<String>,
    pub status: RequestStatus,
}

impl RequestUpdate {
    /// Candidates were found; `ranked` is best first.
    pub fn processed(ranked: Vec<String>) -> Self {
        Self {
            returned_users: ranked,
            status: RequestStatus::Processed,
        }
    }

    pub fn no_match() -> Self {
        Self {
            returned_users: Vec::new(),
            status: RequestStatus::NoMatchFound,
        }
    }
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_skills<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SkillEntry>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.to_string();
            let level = item
                .get("level")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(SkillEntry { name, level })
        })
        .collect())
}

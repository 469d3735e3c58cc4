//! User and request indices built from raw store records.

use crate::normalize::{normalize_skill, SkillMap};
use crate::records::{RequestRecord, UserRecord};
use indexmap::IndexMap;

/// User id → declared skills, in store order.
pub type UserIndex = IndexMap<String, SkillMap>;

/// Request id → pending request, in store order.
pub type RequestIndex = IndexMap<String, PendingRequest>;

/// A pending request reduced to what the matcher needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequest {
    /// The user who created the request; never a candidate for it.
    pub requester: Option<String>,
    /// Required skill → required level, normalized.
    pub required: SkillMap,
}

impl PendingRequest {
    pub fn from_record(record: &RequestRecord) -> Self {
        // Pairs by position; surplus names or levels are dropped.
        let required = record
            .skill_required
            .iter()
            .zip(&record.skill_level_required)
            .map(|(skill, level)| (normalize_skill(skill), normalize_skill(level)))
            .collect();
        Self {
            requester: record.user_id.clone(),
            required,
        }
    }
}

/// Build the user index from raw user records.
///
/// A repeated user id replaces the earlier entry but keeps its position; a
/// repeated skill name keeps the last declared level.
pub fn build_user_index(users: &[UserRecord]) -> UserIndex {
    users
        .iter()
        .map(|user| {
            let skills = user
                .skills
                .iter()
                .map(|entry| (normalize_skill(&entry.name), normalize_skill(&entry.level)))
                .collect();
            (user.id.clone(), skills)
        })
        .collect()
}

/// Build the request index from raw request records, keeping only pending ones.
pub fn build_request_index(requests: &[RequestRecord]) -> RequestIndex {
    requests
        .iter()
        .filter(|record| record.status.is_pending())
        .map(|record| (record.id.clone(), PendingRequest::from_record(record)))
        .collect()
}

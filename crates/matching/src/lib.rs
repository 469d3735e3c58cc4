//! Matching of pending skill requests against a pool of users.
//!
//! This crate provides:
//! - Record types exchanged with the document store, with lenient decoding
//! - Skill name/level normalization
//! - User and request indices built from raw records
//! - Candidate scoring with the full-match filter
//! - Ranking of scored candidates
//!
//! Everything here is pure and synchronous; fetching and writing records is
//! the job of `skillmatch-store`.

#![deny(unsafe_code)]

pub mod index;
pub mod matcher;
pub mod normalize;
pub mod ranker;
pub mod records;

pub use index::{build_request_index, build_user_index, PendingRequest, RequestIndex, UserIndex};
pub use matcher::{score, MatchError, MatchResult, MatchResults};
pub use normalize::{normalize_skill, SkillMap};
pub use ranker::rank;
pub use records::{RequestRecord, RequestStatus, RequestUpdate, SkillEntry, UserRecord};

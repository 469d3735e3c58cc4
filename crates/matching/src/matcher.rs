//! Candidate scoring for a single pending request.

use crate::index::{PendingRequest, UserIndex};
use indexmap::IndexMap;

/// Score of one candidate against one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Required skills the candidate holds at exactly the required level.
    pub matched_skills: usize,
    /// `matched_skills / required`, in `(0.0, 1.0]` for retained candidates.
    pub match_fraction: f64,
    /// `match_fraction * 100`.
    pub match_percentage: f64,
}

impl MatchResult {
    fn new(matched_skills: usize, required: usize) -> Self {
        let match_fraction = matched_skills as f64 / required as f64;
        Self {
            matched_skills,
            match_fraction,
            match_percentage: match_fraction * 100.0,
        }
    }
}

/// User id → score, in user index order.
pub type MatchResults = IndexMap<String, MatchResult>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The request names no required skills, so no fraction can be computed.
    #[error("request has no required skills")]
    NoRequiredSkills,
}

/// Score every user in `users` against `request`.
///
/// The requester and users with no matching skill are skipped. When at least
/// one candidate holds every required skill, only such full matches are kept.
pub fn score(request: &PendingRequest, users: &UserIndex) -> Result<MatchResults, MatchError> {
    let required = request.required.len();
    if required == 0 {
        return Err(MatchError::NoRequiredSkills);
    }

    let mut results = MatchResults::new();
    let mut found_full_match = false;

    for (user_id, skills) in users {
        if request.requester.as_deref() == Some(user_id.as_str()) {
            continue;
        }

        let matched = request
            .required
            .iter()
            .filter(|(skill, level)| skills.get(*skill) == Some(*level))
            .count();
        if matched == 0 {
            continue;
        }

        found_full_match |= matched == required;
        results.insert(user_id.clone(), MatchResult::new(matched, required));
    }

    if found_full_match {
        results.retain(|_, result| result.matched_skills == required);
    }

    tracing::trace!(
        target: "skillmatch::matcher",
        required,
        candidates = results.len(),
        full_match = found_full_match,
        "Scored request"
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SkillMap;

    fn skills(pairs: &[(&str, &str)]) -> SkillMap {
        pairs
            .iter()
            .map(|(s, l)| ((*s).to_string(), (*l).to_string()))
            .collect()
    }

    fn request(requester: &str, required: &[(&str, &str)]) -> PendingRequest {
        PendingRequest {
            requester: Some(requester.to_string()),
            required: skills(required),
        }
    }

    fn users(entries: &[(&str, &[(&str, &str)])]) -> UserIndex {
        entries
            .iter()
            .map(|(id, pairs)| ((*id).to_string(), skills(pairs)))
            .collect()
    }

    #[test]
    fn full_match_excludes_wrong_level() {
        let pool = users(&[
            ("u1", &[("python", "expert")]),
            ("u2", &[("python", "intermediate")]),
        ]);
        let results = score(&request("u3", &[("python", "expert")]), &pool).unwrap();

        assert_eq!(results.len(), 1);
        let u1 = results["u1"];
        assert_eq!(u1.matched_skills, 1);
        assert_eq!(u1.match_fraction, 1.0);
        assert_eq!(u1.match_percentage, 100.0);
    }

    #[test]
    fn full_match_filter_drops_partial_candidates() {
        let pool = users(&[
            ("u1", &[("python", "expert")]),
            ("u2", &[("python", "expert"), ("sql", "intermediate")]),
        ]);
        let results = score(
            &request("u3", &[("python", "expert"), ("sql", "intermediate")]),
            &pool,
        )
        .unwrap();

        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["u2"]);
        assert_eq!(results["u2"].matched_skills, 2);
    }

    #[test]
    fn partial_candidates_kept_without_full_match() {
        let pool = users(&[
            ("u1", &[("python", "expert")]),
            ("u2", &[("sql", "intermediate"), ("go", "beginner")]),
            ("u4", &[("rust", "expert")]),
        ]);
        let results = score(
            &request(
                "u3",
                &[("python", "expert"), ("sql", "intermediate"), ("go", "beginner")],
            ),
            &pool,
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results["u1"].matched_skills, 1);
        assert_eq!(results["u2"].matched_skills, 2);
        assert!((results["u2"].match_fraction - 2.0 / 3.0).abs() < 1e-12);
        assert!(!results.contains_key("u4"));
    }

    #[test]
    fn no_matching_user_yields_empty_results() {
        let pool = users(&[("u1", &[("java", "expert")])]);
        let results = score(&request("u3", &[("python", "expert")]), &pool).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn requester_is_excluded_even_when_qualified() {
        let pool = users(&[
            ("u3", &[("python", "expert")]),
            ("u1", &[("python", "expert")]),
        ]);
        let results = score(&request("u3", &[("python", "expert")]), &pool).unwrap();
        assert!(!results.contains_key("u3"));
        assert!(results.contains_key("u1"));
    }

    #[test]
    fn missing_requester_excludes_nobody() {
        let pool = users(&[("u1", &[("python", "expert")])]);
        let anonymous = PendingRequest {
            requester: None,
            required: skills(&[("python", "expert")]),
        };
        let results = score(&anonymous, &pool).unwrap();
        assert!(results.contains_key("u1"));
    }

    #[test]
    fn empty_requirements_are_rejected() {
        let pool = users(&[("u1", &[("python", "expert")])]);
        assert_eq!(
            score(&request("u3", &[]), &pool),
            Err(MatchError::NoRequiredSkills)
        );
    }
}

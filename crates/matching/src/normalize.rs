//! Skill name and level normalization.

use indexmap::IndexMap;

/// Normalized skill name → normalized proficiency level.
pub type SkillMap = IndexMap<String, String>;

/// Trim and lowercase a skill name or level.
///
/// Applied identically to declared and required skills so that matching is
/// insensitive to case and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use skillmatch_matching::normalize_skill;
///
/// assert_eq!(normalize_skill("  Python "), "python");
/// assert_eq!(normalize_skill("EXPERT"), "expert");
/// ```
#[must_use]
pub fn normalize_skill(raw: &str) -> String {
    raw.trim().to_lowercase()
}

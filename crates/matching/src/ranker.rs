//! Ordering of scored candidates.

use crate::matcher::MatchResults;
use std::cmp::Ordering;

/// Rank candidates best first, or `None` when there are none.
///
/// Sorted by descending match fraction. The sort is stable, so candidates
/// with equal fractions keep their user index order. Match percentage is a
/// fixed multiple of the fraction and is not used as a separate key.
pub fn rank(results: &MatchResults) -> Option<Vec<String>> {
    if results.is_empty() {
        return None;
    }

    let mut ranked: Vec<_> = results.iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.match_fraction
            .partial_cmp(&a.match_fraction)
            .unwrap_or(Ordering::Equal)
    });

    Some(ranked.into_iter().map(|(id, _)| id.clone()).collect())
}

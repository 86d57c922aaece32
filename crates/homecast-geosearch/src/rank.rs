//! Sorting, filtering, and deduplication of raw place candidates.
//!
//! Both provider adapters feed this one ranker; the scoring table lives in
//! [`crate::score`] and is not duplicated per provider.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::score::score_candidate;
use crate::types::{is_assumed_home_country, PlaceCandidate};

/// Rank raw candidates against the original query.
///
/// Candidates explicitly outside the home country are dropped, the rest are
/// scored, zero-scorers are dropped, and the survivors are ordered by:
/// home-country-first, kind priority, match score, provider importance.
/// Duplicate display names keep only their best-ranked entry. The result is
/// truncated to `limit`.
pub fn rank_candidates(
    candidates: Vec<PlaceCandidate>,
    query: &str,
    limit: usize,
) -> Vec<PlaceCandidate> {
    let query_words: Vec<String> = query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| !w.is_empty())
        .collect();
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<PlaceCandidate> = candidates
        .into_iter()
        .filter(|c| is_assumed_home_country(c.country.as_deref()))
        .filter_map(|mut c| {
            let score = score_candidate(&c.name, &query_words);
            if score == 0 {
                return None;
            }
            c.match_score = Some(score);
            Some(c)
        })
        .collect();

    scored.sort_by(|a, b| {
        // Secondary guard: the filter above already removed explicit
        // foreigners, but absent-country candidates still sort home-first.
        let home_a = is_assumed_home_country(a.country.as_deref());
        let home_b = is_assumed_home_country(b.country.as_deref());
        home_b
            .cmp(&home_a)
            .then_with(|| b.kind.priority().cmp(&a.kind.priority()))
            .then_with(|| b.match_score.cmp(&a.match_score))
            .then_with(|| {
                b.importance
                    .partial_cmp(&a.importance)
                    .unwrap_or(Ordering::Equal)
            })
    });

    let mut seen = HashSet::new();
    scored.retain(|c| seen.insert(c.name.to_lowercase()));

    scored.truncate(limit);
    scored
}

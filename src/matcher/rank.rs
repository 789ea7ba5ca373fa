//! Deduplication and ordering of scored candidates.

use crate::matcher::MatchCandidate;
use std::cmp::Ordering;
use std::collections::HashMap;

fn candidate_cmp_asc(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.template_key.cmp(&b.template_key))
}

/// Keeps the lowest-scoring candidate per size token.
///
/// On equal scores the candidate seen first wins, so the result depends only
/// on the input order.
pub(crate) fn dedup_by_token(candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<MatchCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match slots.get(candidate.size_token.as_str()) {
            Some(&idx) => {
                if kept[idx].score > candidate.score {
                    kept[idx] = candidate;
                }
            }
            None => {
                slots.insert(candidate.size_token.as_str().to_string(), kept.len());
                kept.push(candidate);
            }
        }
    }
    kept
}

/// Sorts ascending by score (lower is better) and keeps the first `top_n`.
pub(crate) fn rank_ascending(
    mut candidates: Vec<MatchCandidate>,
    top_n: usize,
) -> Vec<MatchCandidate> {
    candidates.sort_by(candidate_cmp_asc);
    candidates.truncate(top_n);
    candidates
}

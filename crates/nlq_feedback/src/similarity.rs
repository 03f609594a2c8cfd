//! Token-overlap similarity (spec.md §4.9): Jaccard over whitespace-split
//! lowercased tokens with a 0.3 threshold, or substring containment of
//! any query token inside a stored question.

use std::collections::HashSet;

pub const SIMILARITY_THRESHOLD: f64 = 0.3;

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity between two token sets, or `None` if either is
/// empty (defined as 0.0 to keep callers simple, never compared
/// against a threshold as a real match).
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Whether `query` is similar enough to `stored`: Jaccard over the
/// threshold, or any query token appearing verbatim in `stored`.
pub fn is_similar(query: &str, stored: &str) -> bool {
    let query_tokens = tokenize(query);
    let stored_tokens = tokenize(stored);
    if jaccard(&query_tokens, &stored_tokens) >= SIMILARITY_THRESHOLD {
        return true;
    }
    let stored_lower = stored.to_lowercase();
    query_tokens.iter().any(|tok| stored_lower.contains(tok.as_str()))
}

/// Jaccard similarity score between two raw strings, for ranking.
pub fn similarity_score(query: &str, stored: &str) -> f64 {
    jaccard(&tokenize(query), &tokenize(stored))
}

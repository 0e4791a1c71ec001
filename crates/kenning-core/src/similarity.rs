//! # Similarity Scorer
//!
//! Token-overlap similarity between text snippets, and overlap between tag
//! lists.
//!
//! Both scores divide the intersection size by the size of the *smaller*
//! set, so a short snippet fully contained in a longer one scores 1.0.
//! Scores are always finite and within `[0, 1]`.

use crate::primitives::MIN_TOKEN_LEN;
use std::collections::BTreeSet;

/// Split on whitespace, lowercase, and keep tokens of at least `min_len`
/// characters.
#[must_use]
pub fn token_set(text: &str, min_len: usize) -> BTreeSet<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= min_len)
        .collect()
}

/// Overlap score of two pre-tokenized sets: `|A ∩ B| / max(1, min(|A|, |B|))`.
#[must_use]
pub fn set_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let common = a.intersection(b).count();
    let denominator = a.len().min(b.len()).max(1);
    common as f64 / denominator as f64
}

/// Content similarity with the default token length cut.
///
/// Symmetric. Returns 0 when either side has no qualifying tokens.
#[must_use]
pub fn similarity(text_a: &str, text_b: &str) -> f64 {
    similarity_with_min_len(text_a, text_b, MIN_TOKEN_LEN)
}

/// Content similarity with an explicit minimum token length.
#[must_use]
pub fn similarity_with_min_len(text_a: &str, text_b: &str, min_len: usize) -> f64 {
    set_similarity(&token_set(text_a, min_len), &token_set(text_b, min_len))
}

/// Shared tags between two points and the resulting overlap score.
#[derive(Debug, Clone, PartialEq)]
pub struct TagOverlap {
    /// Shared tags, in the order they appear on the first point.
    pub common: Vec<String>,
    /// `|common| / max(1, min(|tags_a|, |tags_b|))` over distinct tags.
    pub score: f64,
}

/// Compute tag overlap. Tags match exactly; duplicates count once.
#[must_use]
pub fn tag_overlap(tags_a: &[String], tags_b: &[String]) -> TagOverlap {
    let mut seen_a = BTreeSet::new();
    let distinct_a: Vec<&String> = tags_a.iter().filter(|t| seen_a.insert(*t)).collect();
    let set_b: BTreeSet<&String> = tags_b.iter().collect();

    let common: Vec<String> = distinct_a
        .iter()
        .filter(|t| set_b.contains(**t))
        .map(|t| (*t).clone())
        .collect();

    let denominator = distinct_a.len().min(set_b.len()).max(1);
    let score = common.len() as f64 / denominator as f64;

    TagOverlap { common, score }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_and_short_strings_score_zero() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("hi", "ok"), 0.0);
        assert_eq!(similarity("hi", "hi"), 0.0);
    }

    #[test]
    fn identical_text_scores_one() {
        let text = "Photosynthesis converts light energy into chemical energy";
        assert_eq!(similarity(text, text), 1.0);
    }

    #[test]
    fn containment_scores_one() {
        let short = "cell membrane";
        let long = "the cell membrane controls what enters and leaves";
        assert_eq!(similarity(short, long), 1.0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(similarity("Energy Transfer", "energy TRANSFER"), 1.0);
    }

    #[test]
    fn partial_overlap() {
        // {alpha, beta, gamma, delta} vs {alpha, beta, epsilon, zeta}
        let score = similarity("alpha beta gamma delta", "alpha beta epsilon zeta");
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_words_count_once() {
        let score = similarity("water water water", "water fire");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn custom_min_len() {
        assert_eq!(similarity_with_min_len("hi ok", "hi there", 2), 1.0);
    }

    #[test]
    fn tag_overlap_uses_smaller_side() {
        let overlap = tag_overlap(&tags(&["a", "b"]), &tags(&["a", "b", "c", "d"]));
        assert_eq!(overlap.common, tags(&["a", "b"]));
        assert_eq!(overlap.score, 1.0);
    }

    #[test]
    fn tag_overlap_empty_is_zero() {
        let overlap = tag_overlap(&[], &tags(&["a"]));
        assert!(overlap.common.is_empty());
        assert_eq!(overlap.score, 0.0);
    }

    #[test]
    fn tag_overlap_ignores_duplicates() {
        let overlap = tag_overlap(&tags(&["a", "a", "b"]), &tags(&["a", "x"]));
        assert_eq!(overlap.common, tags(&["a"]));
        assert!((overlap.score - 0.5).abs() < f64::EPSILON);
    }
}

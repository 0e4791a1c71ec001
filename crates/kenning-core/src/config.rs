//! # Analysis Configuration
//!
//! Tunable thresholds and keyword lists for relation extraction, gap
//! detection and recommendation. Every field has a default, so a partial
//! `[analysis]` TOML table (or an empty one) is valid.

use crate::primitives::{
    MIN_COMMON_TAGS, MIN_TOKEN_LEN, SIMILARITY_THRESHOLD, SPARSE_CATEGORY_MIN,
    TAG_OVERLAP_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// How the relation extractor treats relations emitted by both passes for
/// the same `(source, target, type)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every emitted relation; the relation set is a multiset.
    #[default]
    KeepAll,
    /// Keep one relation per `(source, target, type)`, the strongest.
    KeepStrongest,
}

/// Weights for `recommend::recommend_related`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendWeights {
    pub content: f64,
    pub tags: f64,
    pub category_bonus: f64,
}

impl Default for RecommendWeights {
    fn default() -> Self {
        Self {
            content: 0.6,
            tags: 0.3,
            category_bonus: 0.2,
        }
    }
}

/// Configuration for every analysis in the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Content similarity must be strictly above this to emit `Similar`.
    pub similarity_threshold: f64,
    /// Tag overlap must be strictly above this to emit a tag relation.
    pub tag_overlap_threshold: f64,
    /// Minimum shared tags for a tag relation.
    pub min_common_tags: usize,
    /// Tokens shorter than this many characters are ignored.
    pub min_token_len: usize,
    /// A shared tag containing any of these marks the pair as `Prerequisite`.
    pub foundational_markers: Vec<String>,
    /// A shared tag containing any of these marks the pair as `Extension`.
    pub advanced_markers: Vec<String>,
    /// Categories with fewer points are reported as sparse.
    pub sparse_category_min: usize,
    pub duplicates: DuplicatePolicy,
    pub recommend: RecommendWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            tag_overlap_threshold: TAG_OVERLAP_THRESHOLD,
            min_common_tags: MIN_COMMON_TAGS,
            min_token_len: MIN_TOKEN_LEN,
            foundational_markers: ["基础", "入门", "basic", "fundamental", "introduc"]
                .into_iter()
                .map(String::from)
                .collect(),
            advanced_markers: ["进阶", "延伸", "advanced", "extension"]
                .into_iter()
                .map(String::from)
                .collect(),
            sparse_category_min: SPARSE_CATEGORY_MIN,
            duplicates: DuplicatePolicy::KeepAll,
            recommend: RecommendWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// Whether `tag` contains a foundational marker (case-insensitive).
    #[must_use]
    pub fn is_foundational(&self, tag: &str) -> bool {
        contains_marker(tag, &self.foundational_markers)
    }

    /// Whether `tag` contains an advanced marker (case-insensitive).
    #[must_use]
    pub fn is_advanced(&self, tag: &str) -> bool {
        contains_marker(tag, &self.advanced_markers)
    }
}

fn contains_marker(tag: &str, markers: &[String]) -> bool {
    let tag = tag.to_lowercase();
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .any(|m| tag.contains(&m.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_primitives() {
        let config = AnalysisConfig::default();
        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.tag_overlap_threshold, 0.4);
        assert_eq!(config.min_common_tags, 2);
        assert_eq!(config.duplicates, DuplicatePolicy::KeepAll);
    }

    #[test]
    fn marker_matching_is_substring_and_case_insensitive() {
        let config = AnalysisConfig::default();
        assert!(config.is_foundational("数学基础"));
        assert!(config.is_foundational("Basic Algebra"));
        assert!(config.is_advanced("advanced-topics"));
        assert!(!config.is_advanced("algebra"));
    }

    #[test]
    fn empty_markers_never_match() {
        let config = AnalysisConfig {
            foundational_markers: vec![String::new()],
            ..AnalysisConfig::default()
        };
        assert!(!config.is_foundational("anything"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.7, "duplicates": "keep_strongest"}"#)
                .expect("parse");
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.duplicates, DuplicatePolicy::KeepStrongest);
        assert_eq!(config.min_common_tags, 2);
        assert_eq!(config.recommend, RecommendWeights::default());
    }
}

//! # Recommendation
//!
//! Ranks points related to a given point. The universe of candidates is
//! always passed in explicitly; nothing is read from storage here.
//!
//! `score = content * w.content + tag_overlap * w.tags + (same category ? w.category_bonus : 0)`

use crate::config::{AnalysisConfig, RecommendWeights};
use crate::similarity::{similarity_with_min_len, tag_overlap};
use crate::{KnowledgePoint, PointId};
use serde::{Deserialize, Serialize};

/// A recommended point and its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub point: KnowledgePoint,
    pub score: f64,
}

/// Recommend up to `limit` points related to `point_id` with default weights.
#[must_use]
pub fn recommend_related(
    universe: &[KnowledgePoint],
    point_id: &PointId,
    limit: usize,
) -> Vec<Recommendation> {
    recommend_related_with(universe, point_id, limit, &AnalysisConfig::default())
}

/// Recommend using the weights and token length from `config`.
///
/// Unknown `point_id` yields an empty list. The point itself is never
/// recommended. Ties keep universe order.
#[must_use]
pub fn recommend_related_with(
    universe: &[KnowledgePoint],
    point_id: &PointId,
    limit: usize,
    config: &AnalysisConfig,
) -> Vec<Recommendation> {
    let Some(current) = universe.iter().find(|p| &p.id == point_id) else {
        return Vec::new();
    };

    let mut scored: Vec<Recommendation> = universe
        .iter()
        .filter(|p| &p.id != point_id)
        .map(|candidate| Recommendation {
            score: score(current, candidate, &config.recommend, config.min_token_len),
            point: candidate.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

fn score(
    current: &KnowledgePoint,
    candidate: &KnowledgePoint,
    weights: &RecommendWeights,
    min_token_len: usize,
) -> f64 {
    let content = similarity_with_min_len(&current.content, &candidate.content, min_token_len);
    let tags = tag_overlap(&current.tags, &candidate.tags).score;
    let bonus = if current.category == candidate.category {
        weights.category_bonus
    } else {
        0.0
    };
    content * weights.content + tags * weights.tags + bonus
}

// =============================================================================
// TESTS
// =============================================================================

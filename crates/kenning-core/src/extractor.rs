//! # Relation Extractor
//!
//! Derives typed, weighted relations from a collection of knowledge points.
//!
//! Two independent passes whose results are concatenated:
//! 1. **Category pass**: every unordered pair inside one category whose
//!    content similarity is above the threshold becomes `Similar`.
//! 2. **Tag pass**: every unordered pair across the whole input sharing
//!    enough tags becomes `Similar`, `Prerequisite` (foundational marker on a
//!    shared tag) or `Extension` (advanced marker).
//!
//! Both passes are O(n²) in the number of points. Working sets above
//! [`MAX_ANALYSIS_POINTS`] are still processed, with a warning.
//!
//! Ids of derived relations are deterministic (`similar-{i}-{j}`,
//! `tags-{i}-{j}`, indices into the input slice), so identical input gives
//! identical output.

use crate::config::{AnalysisConfig, DuplicatePolicy};
use crate::primitives::MAX_ANALYSIS_POINTS;
use crate::similarity::{set_similarity, tag_overlap, token_set};
use crate::types::now_millis;
use crate::{KenningError, KnowledgePoint, KnowledgeRelation, PointId, RelationId, RelationType};
use std::collections::{BTreeMap, BTreeSet};

/// Description attached to relations from the category pass.
pub const AUTO_SIMILAR_DESCRIPTION: &str = "Automatically detected similar content";

/// Extracts relations according to an [`AnalysisConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RelationExtractor<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RelationExtractor<'a> {
    /// Create an extractor borrowing the given configuration.
    #[must_use]
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run both passes and apply the configured duplicate policy.
    ///
    /// Fewer than two points yields an empty result.
    #[must_use]
    pub fn extract(&self, points: &[KnowledgePoint]) -> Vec<KnowledgeRelation> {
        if points.len() < 2 {
            return Vec::new();
        }
        if exceeds_analysis_bound(points.len()) {
            tracing::warn!(
                points = points.len(),
                bound = MAX_ANALYSIS_POINTS,
                "Working set exceeds the documented bound for pairwise analysis"
            );
        }

        let mut relations = self.category_pass(points);
        let category_count = relations.len();
        relations.extend(self.tag_pass(points));

        tracing::debug!(
            points = points.len(),
            category_relations = category_count,
            tag_relations = relations.len() - category_count,
            "Relation extraction complete"
        );

        match self.config.duplicates {
            DuplicatePolicy::KeepAll => relations,
            DuplicatePolicy::KeepStrongest => keep_strongest(relations),
        }
    }

    /// Pairwise content similarity within each category.
    fn category_pass(&self, points: &[KnowledgePoint]) -> Vec<KnowledgeRelation> {
        let tokens: Vec<BTreeSet<String>> = points
            .iter()
            .map(|p| token_set(&p.content, self.config.min_token_len))
            .collect();

        let mut relations = Vec::new();
        for members in group_by_category(points).values() {
            for (offset, &i) in members.iter().enumerate() {
                for &j in &members[offset + 1..] {
                    let score = set_similarity(&tokens[i], &tokens[j]);
                    if score > self.config.similarity_threshold {
                        relations.push(KnowledgeRelation::new(
                            RelationId::new(format!("similar-{i}-{j}")),
                            points[i].id.clone(),
                            points[j].id.clone(),
                            RelationType::Similar,
                            score,
                            Some(AUTO_SIMILAR_DESCRIPTION.to_string()),
                            0,
                        ));
                    }
                }
            }
        }
        relations
    }

    /// Pairwise tag overlap over the whole input.
    fn tag_pass(&self, points: &[KnowledgePoint]) -> Vec<KnowledgeRelation> {
        let mut relations = Vec::new();
        for (i, a) in points.iter().enumerate() {
            for (j, b) in points.iter().enumerate().skip(i + 1) {
                let overlap = tag_overlap(&a.tags, &b.tags);
                if overlap.common.len() < self.config.min_common_tags
                    || overlap.score <= self.config.tag_overlap_threshold
                {
                    continue;
                }

                let relation_type = self.classify(&overlap.common);
                relations.push(KnowledgeRelation::new(
                    RelationId::new(format!("tags-{i}-{j}")),
                    a.id.clone(),
                    b.id.clone(),
                    relation_type,
                    overlap.score,
                    Some(format!("Common tags: {}", overlap.common.join(", "))),
                    0,
                ));
            }
        }
        relations
    }

    /// Foundational markers win over advanced markers.
    fn classify(&self, common: &[String]) -> RelationType {
        if common.iter().any(|t| self.config.is_foundational(t)) {
            RelationType::Prerequisite
        } else if common.iter().any(|t| self.config.is_advanced(t)) {
            RelationType::Extension
        } else {
            RelationType::Similar
        }
    }
}

/// Extract relations with the default configuration.
#[must_use]
pub fn analyze_relations(points: &[KnowledgePoint]) -> Vec<KnowledgeRelation> {
    RelationExtractor::new(&AnalysisConfig::default()).extract(points)
}

/// Group point indices by category, categories in first-appearance order.
fn group_by_category(points: &[KnowledgePoint]) -> BTreeMap<usize, Vec<usize>> {
    let mut first_seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, point) in points.iter().enumerate() {
        let key = *first_seen.entry(point.category.as_str()).or_insert(index);
        groups.entry(key).or_default().push(index);
    }
    groups
}

/// Collapse relations sharing `(source, target, type)`, keeping the
/// strongest at the position of the first occurrence.
fn keep_strongest(relations: Vec<KnowledgeRelation>) -> Vec<KnowledgeRelation> {
    let mut slots: BTreeMap<(PointId, PointId, RelationType), usize> = BTreeMap::new();
    let mut kept: Vec<KnowledgeRelation> = Vec::with_capacity(relations.len());

    for relation in relations {
        let key = (
            relation.source_id.clone(),
            relation.target_id.clone(),
            relation.relation_type,
        );
        match slots.get(&key) {
            Some(&slot) => {
                if relation.strength > kept[slot].strength {
                    kept[slot] = relation;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(relation);
            }
        }
    }
    kept
}

// =============================================================================
// MANUAL CREATION
// =============================================================================

/// Create a relation on explicit user request.
///
/// Both endpoints must exist in `points` and differ, otherwise
/// `KenningError::InvalidReference` is returned and nothing is created.
/// Strength is clamped to `[0, 1]`.
pub fn create_relation(
    points: &[KnowledgePoint],
    source_id: &PointId,
    target_id: &PointId,
    relation_type: RelationType,
    strength: f64,
    description: Option<String>,
) -> Result<KnowledgeRelation, KenningError> {
    let exists = |id: &PointId| points.iter().any(|p| &p.id == id);

    if source_id == target_id || !exists(source_id) || !exists(target_id) {
        return Err(KenningError::InvalidReference {
            from: source_id.clone(),
            to: target_id.clone(),
        });
    }

    Ok(KnowledgeRelation::new(
        RelationId::generate(),
        source_id.clone(),
        target_id.clone(),
        relation_type,
        strength,
        description,
        now_millis(),
    ))
}

/// Whether a working set of `count` points is past the size pairwise
/// extraction is documented for.
#[must_use]
pub fn exceeds_analysis_bound(count: usize) -> bool {
    count > MAX_ANALYSIS_POINTS
}

// =============================================================================
// TESTS
// =============================================================================

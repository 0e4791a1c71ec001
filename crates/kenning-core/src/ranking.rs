//! # Key-Node Ranker
//!
//! Ranks knowledge points by degree centrality over the unfiltered relation
//! set. Each relation adds one to both of its endpoints.

use crate::{KnowledgeRelation, PointId};
use std::collections::BTreeMap;

/// Degree of every point touched by `relations`, in encounter order.
///
/// Encounter order visits each relation's source, then its target.
#[must_use]
pub fn degree_counts(relations: &[KnowledgeRelation]) -> Vec<(PointId, usize)> {
    let mut slots: BTreeMap<&PointId, usize> = BTreeMap::new();
    let mut degrees: Vec<(PointId, usize)> = Vec::new();

    for relation in relations {
        for id in [&relation.source_id, &relation.target_id] {
            match slots.get(id) {
                Some(&slot) => degrees[slot].1 += 1,
                None => {
                    slots.insert(id, degrees.len());
                    degrees.push((id.clone(), 1));
                }
            }
        }
    }
    degrees
}

/// Top `limit` point ids by descending degree.
///
/// Ties keep encounter order (stable sort), so the output is reproducible.
#[must_use]
pub fn find_key_points(relations: &[KnowledgeRelation], limit: usize) -> Vec<PointId> {
    let mut degrees = degree_counts(relations);
    degrees.sort_by(|a, b| b.1.cmp(&a.1));
    degrees.into_iter().take(limit).map(|(id, _)| id).collect()
}

// =============================================================================
// TESTS
// =============================================================================

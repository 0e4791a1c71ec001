//! # Graph Metrics
//!
//! Summary counts over a working set, used by status reporting.

use crate::gaps::isolated_points;
use crate::{KnowledgePoint, KnowledgeRelation, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fixed-point scale for density (millionths).
const DENSITY_SCALE: u64 = 1_000_000;

/// Aggregate statistics of a working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub point_count: usize,
    pub relation_count: usize,
    pub category_count: usize,
    pub isolated_count: usize,
    /// Relation count per type; types with no relation are absent.
    pub by_type: BTreeMap<RelationType, usize>,
    /// Relations per point, in millionths. Zero for an empty working set.
    pub density_millionths: u64,
}

impl GraphMetrics {
    /// Compute metrics for the given points and relations.
    #[must_use]
    pub fn compute(points: &[KnowledgePoint], relations: &[KnowledgeRelation]) -> Self {
        let categories: BTreeSet<&str> = points.iter().map(|p| p.category.as_str()).collect();

        let mut by_type: BTreeMap<RelationType, usize> = BTreeMap::new();
        for relation in relations {
            *by_type.entry(relation.relation_type).or_insert(0) += 1;
        }

        let density_millionths = if points.is_empty() {
            0
        } else {
            (relations.len() as u64).saturating_mul(DENSITY_SCALE) / points.len() as u64
        };

        Self {
            point_count: points.len(),
            relation_count: relations.len(),
            category_count: categories.len(),
            isolated_count: isolated_points(points, relations).len(),
            by_type,
            density_millionths,
        }
    }
}

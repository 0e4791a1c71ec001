//! # Gap Detector
//!
//! Structural weaknesses in a working set, reported as typed findings:
//!
//! - **Sparse category**: fewer than `sparse_category_min` points.
//! - **Under-connected category**: enough points, but fewer intra-category
//!   relations than `points - 1` (not even a spanning tree).
//! - **Isolated points**: one aggregate finding counting points touched by
//!   no relation at all.
//!
//! Findings are emitted per category in first-appearance order, followed by
//! the isolated-points finding. Callers should compare findings as a set.

use crate::config::AnalysisConfig;
use crate::{KnowledgePoint, KnowledgeRelation, PointId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Discriminant of a [`GapFinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    Sparse,
    Underconnected,
    Isolated,
}

/// A structural finding about the working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GapFinding {
    /// The category holds `count` points, below the sparse minimum.
    Sparse { category: String, count: usize },
    /// The category holds `points` points but only `count` relations whose
    /// endpoints both lie inside it.
    Underconnected {
        category: String,
        points: usize,
        count: usize,
    },
    /// `count` points are touched by no relation.
    Isolated { count: usize },
}

impl GapFinding {
    #[must_use]
    pub fn kind(&self) -> GapKind {
        match self {
            GapFinding::Sparse { .. } => GapKind::Sparse,
            GapFinding::Underconnected { .. } => GapKind::Underconnected,
            GapFinding::Isolated { .. } => GapKind::Isolated,
        }
    }

    /// The category this finding is about, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            GapFinding::Sparse { category, .. } | GapFinding::Underconnected { category, .. } => {
                Some(category)
            }
            GapFinding::Isolated { .. } => None,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            GapFinding::Sparse { count, .. }
            | GapFinding::Underconnected { count, .. }
            | GapFinding::Isolated { count } => *count,
        }
    }
}

impl fmt::Display for GapFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapFinding::Sparse { category, count } => write!(
                f,
                "Category \"{category}\" has only {count} knowledge point(s); consider adding more"
            ),
            GapFinding::Underconnected {
                category,
                points,
                count,
            } => write!(
                f,
                "Category \"{category}\" has {points} knowledge points but only {count} internal relation(s)"
            ),
            GapFinding::Isolated { count } => {
                write!(f, "{count} knowledge point(s) have no relations")
            }
        }
    }
}

/// Detect gaps with the default configuration.
#[must_use]
pub fn detect_gaps(points: &[KnowledgePoint], relations: &[KnowledgeRelation]) -> Vec<GapFinding> {
    detect_gaps_with(points, relations, &AnalysisConfig::default())
}

/// Detect gaps using `config.sparse_category_min`.
#[must_use]
pub fn detect_gaps_with(
    points: &[KnowledgePoint],
    relations: &[KnowledgeRelation],
    config: &AnalysisConfig,
) -> Vec<GapFinding> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: BTreeMap<&str, BTreeSet<&PointId>> = BTreeMap::new();
    for point in points {
        let set = members.entry(point.category.as_str()).or_insert_with(|| {
            order.push(point.category.as_str());
            BTreeSet::new()
        });
        set.insert(&point.id);
    }

    let mut findings = Vec::new();
    for category in order {
        let Some(ids) = members.get(category) else {
            continue;
        };
        let count = ids.len();
        if count < config.sparse_category_min {
            findings.push(GapFinding::Sparse {
                category: category.to_string(),
                count,
            });
            continue;
        }

        let internal = relations
            .iter()
            .filter(|r| ids.contains(&r.source_id) && ids.contains(&r.target_id))
            .count();
        if internal < count - 1 {
            findings.push(GapFinding::Underconnected {
                category: category.to_string(),
                points: count,
                count: internal,
            });
        }
    }

    let isolated = isolated_points(points, relations).len();
    if isolated > 0 {
        findings.push(GapFinding::Isolated { count: isolated });
    }

    tracing::debug!(findings = findings.len(), "Gap detection complete");
    findings
}

/// Ids of points touched by no relation, in input order.
#[must_use]
pub fn isolated_points<'a>(
    points: &'a [KnowledgePoint],
    relations: &[KnowledgeRelation],
) -> Vec<&'a PointId> {
    let touched: BTreeSet<&PointId> = relations
        .iter()
        .flat_map(|r| [&r.source_id, &r.target_id])
        .collect();
    points
        .iter()
        .map(|p| &p.id)
        .filter(|id| !touched.contains(id))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

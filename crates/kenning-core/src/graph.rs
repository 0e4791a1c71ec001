//! # Graph Builder
//!
//! Converts knowledge points and relations into a visualization-agnostic
//! node/edge model.
//!
//! - Relations are filtered to the active type set.
//! - Only points touched by a surviving relation become nodes; isolated
//!   points stay visible through the gap detector instead.
//! - A relation whose endpoint is not among the supplied points is dropped,
//!   so every edge refers to a node in the same graph.
//! - Nodes follow input point order, edges follow relation order.

use crate::primitives::{EDGE_VALUE_SCALE, NODE_LABEL_CHARS, NODE_VALUE_SCALE};
use crate::{KnowledgePoint, KnowledgeRelation, PointId, RelationId, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// GRAPH MODEL
// =============================================================================

/// A node in the derived graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: PointId,
    /// Truncated content for display.
    pub label: String,
    /// Size hint: `confidence * 10`.
    pub value: f64,
    pub category: String,
    pub tags: Vec<String>,
}

impl GraphNode {
    fn from_point(point: &KnowledgePoint) -> Self {
        Self {
            id: point.id.clone(),
            label: node_label(&point.content),
            value: point.confidence * NODE_VALUE_SCALE,
            category: point.category.clone(),
            tags: point.tags.clone(),
        }
    }
}

/// An edge in the derived graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: RelationId,
    pub source: PointId,
    pub target: PointId,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub label: String,
    /// Weight hint: `strength * 3`.
    pub value: f64,
}

impl GraphEdge {
    fn from_relation(relation: &KnowledgeRelation) -> Self {
        Self {
            id: relation.id.clone(),
            source: relation.source_id.clone(),
            target: relation.target_id.clone(),
            relation_type: relation.relation_type,
            label: relation.relation_type.label().to_string(),
            value: relation.strength.value() * EDGE_VALUE_SCALE,
        }
    }
}

/// Read-only graph view over a working set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a node with this id is present.
    #[must_use]
    pub fn contains_node(&self, id: &PointId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Build a graph from points and relations restricted to `active_types`.
///
/// Deterministic: identical inputs give identical output.
#[must_use]
pub fn build_graph(
    points: &[KnowledgePoint],
    relations: &[KnowledgeRelation],
    active_types: &BTreeSet<RelationType>,
) -> KnowledgeGraph {
    let known: BTreeSet<&PointId> = points.iter().map(|p| &p.id).collect();

    let surviving: Vec<&KnowledgeRelation> = relations
        .iter()
        .filter(|r| active_types.contains(&r.relation_type))
        .filter(|r| known.contains(&r.source_id) && known.contains(&r.target_id))
        .collect();

    let touched: BTreeSet<&PointId> = surviving
        .iter()
        .flat_map(|r| [&r.source_id, &r.target_id])
        .collect();

    // First occurrence wins if the caller passed a duplicated id.
    let mut emitted: BTreeSet<&PointId> = BTreeSet::new();
    let nodes = points
        .iter()
        .filter(|p| touched.contains(&p.id) && emitted.insert(&p.id))
        .map(GraphNode::from_point)
        .collect();

    let edges = surviving
        .into_iter()
        .map(GraphEdge::from_relation)
        .collect();

    KnowledgeGraph { nodes, edges }
}

/// First `NODE_LABEL_CHARS` characters of `content`, with `...` when cut.
#[must_use]
pub fn node_label(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(NODE_LABEL_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::create_relation;

    fn points() -> Vec<KnowledgePoint> {
        vec![
            KnowledgePoint::new("a", "Vectors").with_confidence(0.8),
            KnowledgePoint::new("b", "Matrices"),
            KnowledgePoint::new("c", "Eigenvalues"),
            KnowledgePoint::new("lonely", "Nobody links here"),
        ]
    }

    fn relate(
        points: &[KnowledgePoint],
        s: &str,
        t: &str,
        kind: RelationType,
    ) -> KnowledgeRelation {
        create_relation(points, &PointId::new(s), &PointId::new(t), kind, 0.5, None)
            .expect("relation")
    }

    #[test]
    fn isolated_points_are_not_nodes() {
        let pts = points();
        let relations = vec![relate(&pts, "a", "b", RelationType::Similar)];
        let graph = build_graph(&pts, &relations, &RelationType::all());
        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains_node(&PointId::new("lonely")));
        assert!(!graph.contains_node(&PointId::new("c")));
    }

    #[test]
    fn type_filter_removes_edges_and_their_nodes() {
        let pts = points();
        let relations = vec![
            relate(&pts, "a", "b", RelationType::Similar),
            relate(&pts, "b", "c", RelationType::Prerequisite),
        ];
        let active: BTreeSet<_> = [RelationType::Prerequisite].into_iter().collect();
        let graph = build_graph(&pts, &relations, &active);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].relation_type, RelationType::Prerequisite);
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn empty_filter_gives_empty_graph() {
        let pts = points();
        let relations = vec![relate(&pts, "a", "b", RelationType::Similar)];
        let graph = build_graph(&pts, &relations, &BTreeSet::new());
        assert_eq!(graph, KnowledgeGraph::default());
    }

    #[test]
    fn dangling_edges_are_excluded() {
        let pts = points();
        let relations = vec![relate(&pts, "a", "b", RelationType::Similar)];
        // Graph over a subset that lacks "b"
        let graph = build_graph(&pts[..1], &relations, &RelationType::all());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn node_and_edge_values_are_scaled() {
        let pts = points();
        let relations = vec![relate(&pts, "a", "b", RelationType::ParentChild)];
        let graph = build_graph(&pts, &relations, &RelationType::all());
        assert!((graph.nodes[0].value - 8.0).abs() < 1e-9);
        assert!((graph.edges[0].value - 1.5).abs() < 1e-9);
        assert_eq!(graph.edges[0].label, "Parent/Child");
    }

    #[test]
    fn labels_truncate_after_twenty_chars() {
        assert_eq!(node_label("short"), "short");
        assert_eq!(node_label("exactly twenty chars"), "exactly twenty chars");
        assert_eq!(
            node_label("this sentence is longer than twenty"),
            "this sentence is lon..."
        );
        assert_eq!(
            node_label("光合作用是植物利用光能把二氧化碳和水合成有机物的过程"),
            "光合作用是植物利用光能把二氧化碳和水合成..."
        );
    }
}

//! # Validation Tier Tests (T0-T4)
//!
//! If ANY tier fails, the analysis engine is INVALID.
//!
//! ## Tiers
//! - T0: Similarity Scoring
//! - T1: Relation Extraction
//! - T2: Graph, Ranking, Gaps
//! - T3: Learning Paths
//! - T4: End-to-End

use kenning_core::{
    GapFinding, GapKind, KenningError, KnowledgePoint, KnowledgeRelation, PointId, RelationType,
    analyze_relations, build_graph, create_relation, detect_gaps, find_key_points, generate_path,
    similarity,
};
use std::collections::BTreeSet;

fn point(id: &str, content: &str, category: &str) -> KnowledgePoint {
    KnowledgePoint::new(id, content).with_category(category)
}

fn prerequisite(points: &[KnowledgePoint], from: &str, to: &str) -> KnowledgeRelation {
    create_relation(
        points,
        &PointId::new(from),
        &PointId::new(to),
        RelationType::Prerequisite,
        1.0,
        None,
    )
    .expect("valid prerequisite")
}

fn ids(path: &[KnowledgePoint]) -> Vec<&str> {
    path.iter().map(|p| p.id.as_str()).collect()
}

// =============================================================================
// TIER T0: SIMILARITY SCORING
// =============================================================================

mod t0_similarity {
    use super::*;

    /// T0.1: Similarity is symmetric.
    #[test]
    fn similarity_symmetric() {
        let a = "Newton's laws describe motion and force";
        let b = "force equals mass times acceleration";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    /// T0.2: Empty or short-token-only input scores zero.
    #[test]
    fn short_tokens_score_zero() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("hi", "ok"), 0.0);
    }

    /// T0.3: Containment scores 1.0 because the smaller set is the divisor.
    #[test]
    fn containment_scores_one() {
        assert_eq!(
            similarity("cell membrane", "the cell membrane controls transport"),
            1.0
        );
    }

    /// T0.4: Case is ignored.
    #[test]
    fn case_insensitive() {
        assert_eq!(similarity("Entropy Rises", "entropy rises"), 1.0);
    }
}

// =============================================================================
// TIER T1: RELATION EXTRACTION
// =============================================================================

mod t1_extraction {
    use super::*;

    /// T1.1: Same content and category yields a Similar relation at 1.0.
    #[test]
    fn identical_points_related() {
        let points = vec![
            point("a", "mitochondria produce cellular energy", "biology"),
            point("b", "mitochondria produce cellular energy", "biology"),
        ];
        let relations = analyze_relations(&points);

        assert!(relations.iter().any(|r| {
            r.relation_type == RelationType::Similar && r.strength.value() == 1.0
        }));
    }

    /// T1.2: Different categories never meet in the category pass.
    #[test]
    fn category_pass_stays_in_category() {
        let points = vec![
            point("a", "mitochondria produce cellular energy", "biology"),
            point("b", "mitochondria produce cellular energy", "chemistry"),
        ];
        assert!(analyze_relations(&points).is_empty());
    }

    /// T1.3: Strength is clamped on construction.
    #[test]
    fn strength_clamped() {
        let points = vec![point("a", "x", "c"), point("b", "y", "c")];
        let make = |strength| {
            create_relation(
                &points,
                &PointId::new("a"),
                &PointId::new("b"),
                RelationType::Related,
                strength,
                None,
            )
            .expect("valid relation")
        };

        assert_eq!(make(1.5).strength.value(), 1.0);
        assert_eq!(make(-3.0).strength.value(), 0.0);
    }

    /// T1.4: Self-links and unknown endpoints are rejected.
    #[test]
    fn invalid_references_rejected() {
        let points = vec![point("a", "x", "c")];
        let self_link = create_relation(
            &points,
            &PointId::new("a"),
            &PointId::new("a"),
            RelationType::Related,
            0.5,
            None,
        );
        let unknown = create_relation(
            &points,
            &PointId::new("a"),
            &PointId::new("ghost"),
            RelationType::Related,
            0.5,
            None,
        );

        assert!(matches!(self_link, Err(KenningError::InvalidReference { .. })));
        assert!(matches!(unknown, Err(KenningError::InvalidReference { .. })));
    }

    /// T1.5: Foundational tags turn a tag-overlap pair into a prerequisite.
    #[test]
    fn foundational_tags_classify_prerequisite() {
        let points = vec![
            KnowledgePoint::new("a", "limits")
                .with_category("calculus")
                .with_tags(["basics", "limits", "functions"]),
            KnowledgePoint::new("b", "derivatives")
                .with_category("analysis")
                .with_tags(["basics", "limits", "functions"]),
        ];
        let relations = analyze_relations(&points);

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].relation_type, RelationType::Prerequisite);
        assert_eq!(relations[0].source_id, PointId::new("a"));
    }
}

// =============================================================================
// TIER T2: GRAPH, RANKING, GAPS
// =============================================================================

mod t2_graph_ranking_gaps {
    use super::*;

    fn fixture() -> (Vec<KnowledgePoint>, Vec<KnowledgeRelation>) {
        let points = vec![
            point("a", "x", "c"),
            point("b", "y", "c"),
            point("lonely", "z", "c"),
        ];
        let relations = vec![
            create_relation(
                &points,
                &PointId::new("a"),
                &PointId::new("b"),
                RelationType::Similar,
                0.9,
                None,
            )
            .expect("relation"),
        ];
        (points, relations)
    }

    /// T2.1: A point without relations is never a node, for any type filter.
    #[test]
    fn isolated_point_not_a_node() {
        let (points, relations) = fixture();
        let filters = [
            RelationType::all(),
            BTreeSet::from([RelationType::Similar]),
            BTreeSet::from([RelationType::Prerequisite]),
            BTreeSet::new(),
        ];
        for filter in &filters {
            let graph = build_graph(&points, &relations, filter);
            assert!(!graph.contains_node(&PointId::new("lonely")));
        }
    }

    /// T2.2: Filtering out every relation type leaves an empty graph.
    #[test]
    fn filter_excludes_edges() {
        let (points, relations) = fixture();
        let graph = build_graph(&points, &relations, &BTreeSet::from([RelationType::Extension]));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    /// T2.3: Ranking the same relations twice gives the same order.
    #[test]
    fn key_points_stable() {
        let (_, relations) = fixture();
        let first = find_key_points(&relations, 5);
        assert_eq!(first, find_key_points(&relations, 5));
        assert_eq!(first, vec![PointId::new("a"), PointId::new("b")]);
    }

    /// T2.4: Two points in a category is sparse.
    #[test]
    fn two_point_category_sparse() {
        let points = vec![point("a", "x", "tiny"), point("b", "y", "tiny")];
        let findings = detect_gaps(&points, &[]);
        assert!(findings.contains(&GapFinding::Sparse {
            category: "tiny".to_string(),
            count: 2,
        }));
    }

    /// T2.5: Three fully-connected points produce no category finding.
    #[test]
    fn connected_triple_not_flagged() {
        let points = vec![
            point("a", "x", "trio"),
            point("b", "y", "trio"),
            point("c", "z", "trio"),
        ];
        let relations: Vec<KnowledgeRelation> = [("a", "b"), ("a", "c"), ("b", "c")]
            .into_iter()
            .map(|(from, to)| {
                create_relation(
                    &points,
                    &PointId::new(from),
                    &PointId::new(to),
                    RelationType::Related,
                    0.5,
                    None,
                )
                .expect("relation")
            })
            .collect();

        assert!(detect_gaps(&points, &relations).is_empty());
    }

    /// T2.6: Isolated points are reported as one counted finding.
    #[test]
    fn isolated_points_reported() {
        let (points, relations) = fixture();
        let findings = detect_gaps(&points, &relations);
        let isolated: Vec<_> = findings
            .iter()
            .filter(|f| f.kind() == GapKind::Isolated)
            .collect();
        assert_eq!(isolated.len(), 1);
        assert_eq!(isolated[0].count(), 1);
    }
}

// =============================================================================
// TIER T3: LEARNING PATHS
// =============================================================================

mod t3_learning_path {
    use super::*;

    fn chain() -> (Vec<KnowledgePoint>, Vec<KnowledgeRelation>) {
        let points = vec![point("A", "a", "c"), point("B", "b", "c"), point("C", "c", "c")];
        let relations = vec![prerequisite(&points, "B", "C"), prerequisite(&points, "A", "B")];
        (points, relations)
    }

    /// T3.1: Prerequisites come first.
    #[test]
    fn chain_ordered() {
        let (points, relations) = chain();
        let path = generate_path(&points, &relations, &[PointId::new("C")]);
        assert_eq!(ids(&path), vec!["A", "B", "C"]);
    }

    /// T3.2: Repeating a target does not repeat output.
    #[test]
    fn repeated_target_idempotent() {
        let (points, relations) = chain();
        let once = generate_path(&points, &relations, &[PointId::new("C")]);
        let twice = generate_path(&points, &relations, &[PointId::new("C"), PointId::new("C")]);
        assert_eq!(once, twice);
    }

    /// T3.3: A cycle terminates with each member emitted once.
    #[test]
    fn cycle_terminates() {
        let points = vec![point("A", "a", "c"), point("B", "b", "c")];
        let relations = vec![prerequisite(&points, "A", "B"), prerequisite(&points, "B", "A")];
        let path = generate_path(&points, &relations, &[PointId::new("A")]);
        assert_eq!(path.len(), 2);
    }

    /// T3.4: Non-dependency relations do not order the path.
    #[test]
    fn similar_relations_ignored() {
        let points = vec![point("A", "a", "c"), point("B", "b", "c")];
        let relations = vec![
            create_relation(
                &points,
                &PointId::new("A"),
                &PointId::new("B"),
                RelationType::Similar,
                1.0,
                None,
            )
            .expect("relation"),
        ];
        let path = generate_path(&points, &relations, &[PointId::new("B")]);
        assert_eq!(ids(&path), vec!["B"]);
    }
}

// =============================================================================
// TIER T4: END-TO-END
// =============================================================================

mod t4_end_to_end {
    use super::*;

    /// T4.1: Five identical science points form a complete graph.
    #[test]
    fn science_category_complete_graph() {
        let points: Vec<KnowledgePoint> = (1..=5)
            .map(|i| {
                point(
                    &format!("sci-{i}"),
                    "energy is conserved in closed systems",
                    "science",
                )
            })
            .collect();

        let relations = analyze_relations(&points);
        assert_eq!(relations.len(), 10);
        assert!(relations.iter().all(|r| {
            r.relation_type == RelationType::Similar && r.strength.value() == 1.0
        }));

        let graph = build_graph(&points, &relations, &RelationType::all());
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 10);

        assert_eq!(find_key_points(&relations, 1), vec![PointId::new("sci-1")]);
        assert!(detect_gaps(&points, &relations).is_empty());
    }
}

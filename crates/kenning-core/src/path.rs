//! # Learning-Path Generator
//!
//! Orders knowledge points so every prerequisite precedes what depends on it.
//!
//! Only `Prerequisite` and `ParentChild` relations take part: the target of
//! such a relation depends on its source. For each requested target, in
//! caller order, a depth-first walk over dependencies emits points in
//! post-order. The visited set is shared across targets, so a prerequisite
//! common to several targets is emitted once, at its first discovery.
//!
//! ## Cycles
//!
//! [`generate_path`] never loops on cyclic dependencies, but inside a cycle
//! the first member reached is emitted before a member it transitively
//! depends on. The result is then an approximation, not a topological
//! order. [`generate_path_strict`] refuses cyclic input with
//! `KenningError::CyclicDependency` instead.

use crate::{KenningError, KnowledgePoint, KnowledgeRelation, PointId};
use std::collections::{BTreeMap, BTreeSet};

/// Dependency lists keyed by dependent point, in relation order.
type DependencyMap<'a> = BTreeMap<&'a PointId, Vec<&'a PointId>>;

fn dependency_map(relations: &[KnowledgeRelation]) -> DependencyMap<'_> {
    let mut deps: DependencyMap<'_> = BTreeMap::new();
    for relation in relations.iter().filter(|r| r.relation_type.is_dependency()) {
        deps.entry(&relation.target_id)
            .or_default()
            .push(&relation.source_id);
    }
    deps
}

fn dependencies_of<'m, 'a>(deps: &'m DependencyMap<'a>, id: &PointId) -> &'m [&'a PointId] {
    deps.get(id).map(Vec::as_slice).unwrap_or(&[])
}

/// Generate a learning path ending with `targets`.
///
/// Unknown target ids are skipped. Dependencies that are not among `points`
/// are traversed but not emitted. The output contains no duplicates.
#[must_use]
pub fn generate_path(
    points: &[KnowledgePoint],
    relations: &[KnowledgeRelation],
    targets: &[PointId],
) -> Vec<KnowledgePoint> {
    let mut by_id: BTreeMap<&PointId, &KnowledgePoint> = BTreeMap::new();
    for point in points {
        by_id.entry(&point.id).or_insert(point);
    }
    let deps = dependency_map(relations);

    let mut visited: BTreeSet<&PointId> = BTreeSet::new();
    let mut path: Vec<&KnowledgePoint> = Vec::new();

    for target in targets {
        let Some((&root, _)) = by_id.get_key_value(target) else {
            continue;
        };
        if !visited.insert(root) {
            continue;
        }

        // Iterative post-order: (point, index of the next dependency to try)
        let mut stack: Vec<(&PointId, usize)> = vec![(root, 0)];
        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            frame.1 += 1;
            match dependencies_of(&deps, id).get(next) {
                Some(&dep) => {
                    if visited.insert(dep) {
                        stack.push((dep, 0));
                    }
                }
                None => {
                    stack.pop();
                    if let Some(&point) = by_id.get(id) {
                        path.push(point);
                    }
                }
            }
        }
    }

    // Targets the walk did not emit go last.
    for target in targets {
        if path.iter().any(|p| &p.id == target) {
            continue;
        }
        if let Some(&point) = by_id.get(target) {
            path.push(point);
        }
    }

    tracing::debug!(
        targets = targets.len(),
        length = path.len(),
        "Learning path generated"
    );
    path.into_iter().cloned().collect()
}

/// Like [`generate_path`], but fails if the dependencies reachable from the
/// known targets contain a cycle.
pub fn generate_path_strict(
    points: &[KnowledgePoint],
    relations: &[KnowledgeRelation],
    targets: &[PointId],
) -> Result<Vec<KnowledgePoint>, KenningError> {
    let known: BTreeSet<&PointId> = points.iter().map(|p| &p.id).collect();
    let deps = dependency_map(relations);
    let starts = targets.iter().filter(|t| known.contains(t));

    if let Some(cycle) = find_cycle_from(&deps, starts) {
        tracing::warn!(members = cycle.len(), "Cyclic dependency in learning path");
        return Err(KenningError::CyclicDependency(cycle));
    }
    Ok(generate_path(points, relations, targets))
}

/// Find any cycle among `Prerequisite`/`ParentChild` relations.
///
/// The cycle is returned in learning order: each id is a prerequisite of the
/// next, and the last is a prerequisite of the first.
#[must_use]
pub fn find_dependency_cycle(relations: &[KnowledgeRelation]) -> Option<Vec<PointId>> {
    let deps = dependency_map(relations);
    let starts = relations
        .iter()
        .filter(|r| r.relation_type.is_dependency())
        .map(|r| &r.target_id);
    find_cycle_from(&deps, starts)
}

fn find_cycle_from<'a>(
    deps: &DependencyMap<'a>,
    starts: impl IntoIterator<Item = &'a PointId>,
) -> Option<Vec<PointId>> {
    let mut finished: BTreeSet<&PointId> = BTreeSet::new();

    for start in starts {
        if finished.contains(start) {
            continue;
        }
        let mut stack: Vec<(&PointId, usize)> = vec![(start, 0)];
        let mut on_stack: BTreeSet<&PointId> = BTreeSet::from([start]);

        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            frame.1 += 1;
            match dependencies_of(deps, id).get(next) {
                Some(&dep) if on_stack.contains(dep) => {
                    let from = stack.iter().position(|(n, _)| *n == dep)?;
                    // Stack order is "depends on"; reverse for learning order.
                    return Some(
                        stack[from..]
                            .iter()
                            .rev()
                            .map(|(n, _)| (*n).clone())
                            .collect(),
                    );
                }
                Some(&dep) => {
                    if !finished.contains(dep) {
                        on_stack.insert(dep);
                        stack.push((dep, 0));
                    }
                }
                None => {
                    stack.pop();
                    on_stack.remove(id);
                    finished.insert(id);
                }
            }
        }
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::extractor::create_relation;
    use crate::RelationType;

    fn points(ids: &[&str]) -> Vec<KnowledgePoint> {
        ids.iter()
            .map(|id| KnowledgePoint::new(*id, format!("content of {id}")))
            .collect()
    }

    fn rel(
        points: &[KnowledgePoint],
        s: &str,
        t: &str,
        kind: RelationType,
    ) -> KnowledgeRelation {
        create_relation(points, &PointId::new(s), &PointId::new(t), kind, 1.0, None)
            .expect("relation")
    }

    fn ids(path: &[KnowledgePoint]) -> Vec<&str> {
        path.iter().map(|p| p.id.as_str()).collect()
    }

    fn targets(list: &[&str]) -> Vec<PointId> {
        list.iter().map(|s| PointId::new(*s)).collect()
    }

    #[test]
    fn chain_is_ordered() {
        let pts = points(&["A", "B", "C"]);
        let relations = vec![
            rel(&pts, "B", "C", RelationType::Prerequisite),
            rel(&pts, "A", "B", RelationType::Prerequisite),
        ];
        let path = generate_path(&pts, &relations, &targets(&["C"]));
        assert_eq!(ids(&path), vec!["A", "B", "C"]);
    }

    #[test]
    fn repeated_target_is_emitted_once() {
        let pts = points(&["A", "B", "C"]);
        let relations = vec![
            rel(&pts, "B", "C", RelationType::Prerequisite),
            rel(&pts, "A", "B", RelationType::Prerequisite),
        ];
        let once = generate_path(&pts, &relations, &targets(&["C"]));
        let twice = generate_path(&pts, &relations, &targets(&["C", "C"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn parent_child_counts_as_dependency() {
        let pts = points(&["topic", "subtopic"]);
        let relations = vec![rel(&pts, "topic", "subtopic", RelationType::ParentChild)];
        let path = generate_path(&pts, &relations, &targets(&["subtopic"]));
        assert_eq!(ids(&path), vec!["topic", "subtopic"]);
    }

    #[test]
    fn non_dependency_relations_are_ignored() {
        let pts = points(&["A", "B"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Similar),
            rel(&pts, "A", "B", RelationType::Extension),
        ];
        let path = generate_path(&pts, &relations, &targets(&["B"]));
        assert_eq!(ids(&path), vec!["B"]);
    }

    #[test]
    fn shared_prerequisite_emitted_at_first_discovery() {
        let pts = points(&["base", "left", "right"]);
        let relations = vec![
            rel(&pts, "base", "left", RelationType::Prerequisite),
            rel(&pts, "base", "right", RelationType::Prerequisite),
        ];
        let path = generate_path(&pts, &relations, &targets(&["left", "right"]));
        assert_eq!(ids(&path), vec!["base", "left", "right"]);
    }

    #[test]
    fn dependencies_follow_relation_order() {
        let pts = points(&["x", "y", "goal"]);
        let relations = vec![
            rel(&pts, "y", "goal", RelationType::Prerequisite),
            rel(&pts, "x", "goal", RelationType::Prerequisite),
        ];
        let path = generate_path(&pts, &relations, &targets(&["goal"]));
        assert_eq!(ids(&path), vec!["y", "x", "goal"]);
    }

    #[test]
    fn unknown_targets_are_skipped() {
        let pts = points(&["A"]);
        let path = generate_path(&pts, &[], &targets(&["missing", "A"]));
        assert_eq!(ids(&path), vec!["A"]);
        assert!(generate_path(&pts, &[], &targets(&["missing"])).is_empty());
    }

    #[test]
    fn cycle_terminates_with_first_discovery() {
        let pts = points(&["A", "B"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Prerequisite),
            rel(&pts, "B", "A", RelationType::Prerequisite),
        ];
        let path = generate_path(&pts, &relations, &targets(&["B"]));
        assert_eq!(ids(&path), vec!["A", "B"]);
    }

    #[test]
    fn strict_rejects_cycles() {
        let pts = points(&["A", "B", "C"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Prerequisite),
            rel(&pts, "B", "C", RelationType::Prerequisite),
            rel(&pts, "C", "A", RelationType::ParentChild),
        ];
        let err = generate_path_strict(&pts, &relations, &targets(&["C"])).expect_err("cycle");
        match err {
            KenningError::CyclicDependency(cycle) => {
                assert_eq!(cycle.len(), 3);
                let members: BTreeSet<_> = cycle.iter().map(PointId::as_str).collect();
                assert_eq!(members, BTreeSet::from(["A", "B", "C"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_ignores_unreachable_cycles() {
        let pts = points(&["A", "B", "X", "Y"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Prerequisite),
            rel(&pts, "X", "Y", RelationType::Prerequisite),
            rel(&pts, "Y", "X", RelationType::Prerequisite),
        ];
        let path = generate_path_strict(&pts, &relations, &targets(&["B"])).expect("acyclic");
        assert_eq!(ids(&path), vec!["A", "B"]);
    }

    #[test]
    fn cycle_is_reported_in_learning_order() {
        let pts = points(&["A", "B"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Prerequisite),
            rel(&pts, "B", "A", RelationType::Prerequisite),
        ];
        let cycle = find_dependency_cycle(&relations).expect("cycle");
        // Starting at B: B depends on A, A depends on B
        assert_eq!(cycle, vec![PointId::new("A"), PointId::new("B")]);
    }

    #[test]
    fn acyclic_relations_have_no_cycle() {
        let pts = points(&["A", "B", "C"]);
        let relations = vec![
            rel(&pts, "A", "B", RelationType::Prerequisite),
            rel(&pts, "A", "C", RelationType::Prerequisite),
            rel(&pts, "B", "C", RelationType::Prerequisite),
        ];
        assert!(find_dependency_cycle(&relations).is_none());
    }
}

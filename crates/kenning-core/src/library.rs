//! # Library Module
//!
//! A working set of knowledge points and relations, optionally backed by a
//! [`KnowledgeRepository`].
//!
//! The library is the only stateful type in the core. It enforces the
//! working-set invariants (unique point ids, relations referencing existing
//! points) and hands its collections to the pure analysis functions.
//!
//! ## Persistence
//!
//! With a repository attached, every mutation is written through before the
//! in-memory state changes, so a failed save leaves the library untouched.
//! A mutation touching both collections is saved through
//! [`KnowledgeRepository::save_all`], which commits both or neither.
//! Without one the library is purely in memory.

use crate::config::AnalysisConfig;
use crate::export::ExportBundle;
#[cfg(feature = "crypto-hash")]
use crate::export::export_binary;
use crate::extractor::{RelationExtractor, create_relation};
use crate::gaps::{GapFinding, detect_gaps_with};
use crate::graph::{KnowledgeGraph, build_graph};
use crate::ingestor::Ingestor;
use crate::metrics::GraphMetrics;
use crate::path::{generate_path, generate_path_strict};
use crate::ranking::find_key_points;
use crate::recommend::{Recommendation, recommend_related_with};
use crate::storage::KnowledgeRepository;
use crate::types::now_millis;
use crate::{KenningError, KnowledgePoint, KnowledgeRelation, PointId, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How an imported bundle combines with the current working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Discard the current working set.
    #[default]
    Replace,
    /// Keep existing points; add new points and relations whose endpoints exist.
    Merge,
}

/// Outcome of a merge-style operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub points_added: usize,
    pub points_skipped: usize,
    pub relations_added: usize,
    pub relations_skipped: usize,
}

/// A working set of points and relations.
#[derive(Default)]
pub struct Library {
    points: Vec<KnowledgePoint>,
    relations: Vec<KnowledgeRelation>,
    config: AnalysisConfig,
    store: Option<Box<dyn KnowledgeRepository>>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("points", &self.points.len())
            .field("relations", &self.relations.len())
            .field("backend", &self.backend_name())
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Create an empty in-memory library with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-memory library with the given configuration.
    #[must_use]
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load a library from a repository. Later mutations are written back.
    pub fn open(
        store: Box<dyn KnowledgeRepository>,
        config: AnalysisConfig,
    ) -> Result<Self, KenningError> {
        let points = store.load_points()?;
        let relations = store.load_relations()?;
        Ingestor::validate_batch([], &points)?;
        check_references(&points, &relations)?;

        tracing::debug!(
            backend = store.backend_name(),
            points = points.len(),
            relations = relations.len(),
            "Library loaded"
        );

        Ok(Self {
            points,
            relations,
            config,
            store: Some(store),
        })
    }

    /// Whether mutations are persisted.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Backend name, or `"memory"` without a repository.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.store.as_ref().map_or("memory", |s| s.backend_name())
    }

    #[must_use]
    pub fn points(&self) -> &[KnowledgePoint] {
        &self.points
    }

    #[must_use]
    pub fn relations(&self) -> &[KnowledgeRelation] {
        &self.relations
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Look up a point by id.
    pub fn get_point(&self, id: &PointId) -> Result<&KnowledgePoint, KenningError> {
        self.points
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| KenningError::PointNotFound(id.clone()))
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Add new points. Any invalid point or id collision rejects the batch.
    pub fn add_points(&mut self, mut batch: Vec<KnowledgePoint>) -> Result<usize, KenningError> {
        Ingestor::validate_batch(self.points.iter().map(|p| &p.id), &batch)?;
        Ingestor::stamp(&mut batch);

        let added = batch.len();
        let mut points = self.points.clone();
        points.extend(batch);
        self.commit(Some(points), None)?;

        tracing::info!(added, total = self.points.len(), "Points added");
        Ok(added)
    }

    /// Add points whose ids are not yet present; skip the rest.
    ///
    /// Invalid points still fail the whole batch.
    pub fn merge_points(
        &mut self,
        batch: Vec<KnowledgePoint>,
    ) -> Result<MergeSummary, KenningError> {
        let mut seen: BTreeSet<PointId> = self.points.iter().map(|p| p.id.clone()).collect();
        let mut fresh = Vec::new();
        let mut skipped = 0;
        for point in batch {
            Ingestor::validate(&point)?;
            if seen.insert(point.id.clone()) {
                fresh.push(point);
            } else {
                skipped += 1;
            }
        }
        Ingestor::stamp(&mut fresh);

        let added = fresh.len();
        if added > 0 {
            let mut points = self.points.clone();
            points.extend(fresh);
            self.commit(Some(points), None)?;
        }

        Ok(MergeSummary {
            points_added: added,
            points_skipped: skipped,
            ..MergeSummary::default()
        })
    }

    /// Replace a point with the same id, keeping its position.
    pub fn update_point(&mut self, point: KnowledgePoint) -> Result<(), KenningError> {
        Ingestor::validate(&point)?;
        let index = self
            .points
            .iter()
            .position(|p| p.id == point.id)
            .ok_or_else(|| KenningError::PointNotFound(point.id.clone()))?;

        let mut points = self.points.clone();
        points[index] = point;
        self.commit(Some(points), None)
    }

    /// Remove a point and every relation touching it.
    pub fn remove_point(&mut self, id: &PointId) -> Result<KnowledgePoint, KenningError> {
        let index = self
            .points
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| KenningError::PointNotFound(id.clone()))?;

        let mut points = self.points.clone();
        let removed = points.remove(index);
        let relations: Vec<KnowledgeRelation> = self
            .relations
            .iter()
            .filter(|r| !r.touches(id))
            .cloned()
            .collect();
        let dropped = self.relations.len() - relations.len();
        self.commit(Some(points), Some(relations))?;

        tracing::info!(point = %id, dropped_relations = dropped, "Point removed");
        Ok(removed)
    }

    /// Create a validated relation and add it to the working set.
    pub fn create_relation(
        &mut self,
        source_id: &PointId,
        target_id: &PointId,
        relation_type: RelationType,
        strength: f64,
        description: Option<String>,
    ) -> Result<KnowledgeRelation, KenningError> {
        let relation = create_relation(
            &self.points,
            source_id,
            target_id,
            relation_type,
            strength,
            description,
        )?;

        let mut relations = self.relations.clone();
        relations.push(relation.clone());
        self.commit(None, Some(relations))?;
        Ok(relation)
    }

    /// Re-derive relations from the current points, replacing the whole
    /// relation set (manually created relations included).
    pub fn analyze(&mut self) -> Result<usize, KenningError> {
        let relations = RelationExtractor::new(&self.config).extract(&self.points);
        let count = relations.len();
        self.commit(None, Some(relations))?;

        tracing::info!(
            points = self.points.len(),
            relations = count,
            "Relation analysis complete"
        );
        Ok(count)
    }

    /// Replace the relation set. Every relation must reference two distinct
    /// points of the working set.
    pub fn replace_relations(
        &mut self,
        relations: Vec<KnowledgeRelation>,
    ) -> Result<(), KenningError> {
        check_references(&self.points, &relations)?;
        self.commit(None, Some(relations))
    }

    /// Remove every point and relation.
    pub fn clear(&mut self) -> Result<(), KenningError> {
        self.commit(Some(Vec::new()), Some(Vec::new()))
    }

    /// Persist first, then swap in the new collections.
    fn commit(
        &mut self,
        points: Option<Vec<KnowledgePoint>>,
        relations: Option<Vec<KnowledgeRelation>>,
    ) -> Result<(), KenningError> {
        if let Some(store) = &self.store {
            match (&points, &relations) {
                (Some(points), Some(relations)) => store.save_all(points, relations)?,
                (Some(points), None) => store.save_points(points)?,
                (None, Some(relations)) => store.save_relations(relations)?,
                (None, None) => {}
            }
        }
        if let Some(points) = points {
            self.points = points;
        }
        if let Some(relations) = relations {
            self.relations = relations;
        }
        Ok(())
    }

    // =========================================================================
    // ANALYSIS
    // =========================================================================

    /// Graph view restricted to `active_types`.
    #[must_use]
    pub fn graph(&self, active_types: &BTreeSet<RelationType>) -> KnowledgeGraph {
        build_graph(&self.points, &self.relations, active_types)
    }

    #[must_use]
    pub fn key_points(&self, limit: usize) -> Vec<PointId> {
        find_key_points(&self.relations, limit)
    }

    #[must_use]
    pub fn gaps(&self) -> Vec<GapFinding> {
        detect_gaps_with(&self.points, &self.relations, &self.config)
    }

    /// Learning path to `targets`; `strict` refuses cyclic dependencies.
    pub fn learning_path(
        &self,
        targets: &[PointId],
        strict: bool,
    ) -> Result<Vec<KnowledgePoint>, KenningError> {
        if strict {
            generate_path_strict(&self.points, &self.relations, targets)
        } else {
            Ok(generate_path(&self.points, &self.relations, targets))
        }
    }

    #[must_use]
    pub fn recommend(&self, point_id: &PointId, limit: usize) -> Vec<Recommendation> {
        recommend_related_with(&self.points, point_id, limit, &self.config)
    }

    #[must_use]
    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics::compute(&self.points, &self.relations)
    }

    // =========================================================================
    // EXPORT / IMPORT
    // =========================================================================

    /// Snapshot the working set as an export bundle.
    #[must_use]
    pub fn export_bundle(&self) -> ExportBundle {
        ExportBundle::new(self.points.clone(), self.relations.clone(), now_millis())
    }

    /// BLAKE3 digest of the working set's binary export.
    ///
    /// The export timestamp is fixed at zero, so equal working sets hash
    /// equally.
    #[cfg(feature = "crypto-hash")]
    pub fn content_hash(&self) -> Result<String, KenningError> {
        let bundle = ExportBundle::new(self.points.clone(), self.relations.clone(), 0);
        Ok(crate::export::bundle_crypto_hash(&export_binary(&bundle)?))
    }

    /// Apply a bundle. The bundle is validated before anything changes.
    pub fn import_bundle(
        &mut self,
        bundle: ExportBundle,
        mode: ImportMode,
    ) -> Result<MergeSummary, KenningError> {
        bundle.validate()?;

        match mode {
            ImportMode::Replace => {
                let summary = MergeSummary {
                    points_added: bundle.points.len(),
                    relations_added: bundle.relations.len(),
                    ..MergeSummary::default()
                };
                self.commit(Some(bundle.points), Some(bundle.relations))?;
                Ok(summary)
            }
            ImportMode::Merge => {
                let mut summary = MergeSummary::default();
                let mut points = self.points.clone();
                let mut ids: BTreeSet<PointId> = points.iter().map(|p| p.id.clone()).collect();
                for point in bundle.points {
                    if ids.insert(point.id.clone()) {
                        points.push(point);
                        summary.points_added += 1;
                    } else {
                        summary.points_skipped += 1;
                    }
                }

                let mut relations = self.relations.clone();
                let mut relation_ids: BTreeSet<_> =
                    relations.iter().map(|r| r.id.clone()).collect();
                for relation in bundle.relations {
                    let linked =
                        ids.contains(&relation.source_id) && ids.contains(&relation.target_id);
                    if linked && relation_ids.insert(relation.id.clone()) {
                        relations.push(relation);
                        summary.relations_added += 1;
                    } else {
                        summary.relations_skipped += 1;
                    }
                }

                self.commit(Some(points), Some(relations))?;
                Ok(summary)
            }
        }
    }
}

/// Every relation must join two distinct points of `points`.
fn check_references(
    points: &[KnowledgePoint],
    relations: &[KnowledgeRelation],
) -> Result<(), KenningError> {
    let ids: BTreeSet<&PointId> = points.iter().map(|p| &p.id).collect();
    let dangling = |r: &&KnowledgeRelation| {
        r.source_id == r.target_id || !ids.contains(&r.source_id) || !ids.contains(&r.target_id)
    };
    match relations.iter().find(dangling) {
        Some(bad) => Err(KenningError::InvalidReference {
            from: bad.source_id.clone(),
            to: bad.target_id.clone(),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, RedbStore};
    use tempfile::tempdir;

    fn science() -> Vec<KnowledgePoint> {
        vec![
            KnowledgePoint::new("atoms", "atoms are made of protons neutrons electrons")
                .with_category("science")
                .with_tags(["chemistry", "basics"]),
            KnowledgePoint::new("bonds", "chemical bonds join atoms into molecules")
                .with_category("science")
                .with_tags(["chemistry", "basics"]),
            KnowledgePoint::new("reactions", "reactions rearrange chemical bonds")
                .with_category("science"),
        ]
    }

    #[cfg(feature = "crypto-hash")]
    #[test]
    fn content_hash_tracks_working_set() {
        let mut a = Library::new();
        a.add_points(science()).expect("add");
        let mut b = Library::new();
        b.import_bundle(a.export_bundle(), ImportMode::Replace)
            .expect("import");
        assert_eq!(a.content_hash().expect("hash"), b.content_hash().expect("hash"));

        b.analyze().expect("analyze");
        assert_ne!(a.content_hash().expect("hash"), b.content_hash().expect("hash"));
    }

    #[test]
    fn update_point_keeps_position() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        library
            .update_point(KnowledgePoint::new("bonds", "covalent bonds").with_category("chem"))
            .expect("update");

        assert_eq!(library.points()[1].content, "covalent bonds");
        assert_eq!(library.points().len(), 3);

        let missing = library.update_point(KnowledgePoint::new("ghost", "x"));
        assert!(matches!(missing, Err(KenningError::PointNotFound(_))));
    }

    #[test]
    fn clear_empties_persisted_store() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("kb.redb");
        {
            let store = RedbStore::open(&path).expect("open");
            let mut library =
                Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
            library.add_points(science()).expect("add");
            library.analyze().expect("analyze");
            library.clear().expect("clear");
            assert!(library.points().is_empty());
        }

        let store = RedbStore::open(&path).expect("reopen");
        let library = Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
        assert!(library.points().is_empty());
        assert!(library.relations().is_empty());
    }

    /// In-memory repository whose relation writes always fail.
    #[derive(Default)]
    struct BrokenRelations {
        saved: std::sync::Mutex<(Vec<KnowledgePoint>, Vec<KnowledgeRelation>)>,
    }

    impl KnowledgeRepository for BrokenRelations {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        fn load_points(&self) -> Result<Vec<KnowledgePoint>, KenningError> {
            Ok(self.saved.lock().expect("lock").0.clone())
        }

        fn save_points(&self, points: &[KnowledgePoint]) -> Result<(), KenningError> {
            self.saved.lock().expect("lock").0 = points.to_vec();
            Ok(())
        }

        fn load_relations(&self) -> Result<Vec<KnowledgeRelation>, KenningError> {
            Ok(self.saved.lock().expect("lock").1.clone())
        }

        fn save_relations(&self, _: &[KnowledgeRelation]) -> Result<(), KenningError> {
            Err(KenningError::IoError("disk full".into()))
        }

        fn save_all(
            &self,
            _: &[KnowledgePoint],
            relations: &[KnowledgeRelation],
        ) -> Result<(), KenningError> {
            self.save_relations(relations)
        }
    }

    #[test]
    fn failed_relation_save_leaves_store_and_memory_in_step() {
        let mut library =
            Library::open(Box::<BrokenRelations>::default(), AnalysisConfig::default())
                .expect("library");
        library.add_points(science()).expect("add");

        assert!(library.analyze().is_err());
        assert!(library.clear().is_err());
        assert_eq!(library.points().len(), 3);
        assert!(library.relations().is_empty());
    }

    #[test]
    fn failed_clear_keeps_file_store_consistent() {
        let temp = tempdir().expect("temp dir");
        let dir = temp.path().join("lib");
        {
            let store = JsonFileStore::open(&dir).expect("open");
            let mut library =
                Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
            library.add_points(science()).expect("add");
            library.analyze().expect("analyze");

            std::fs::create_dir(dir.join("relations.json.tmp")).expect("block");
            assert!(library.clear().is_err());
            assert_eq!(library.points().len(), 3);
            std::fs::remove_dir(dir.join("relations.json.tmp")).expect("unblock");
        }

        let store = JsonFileStore::open(&dir).expect("reopen");
        let library = Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
        assert_eq!(library.points().len(), 3);
        assert!(!library.relations().is_empty());
    }

    #[test]
    fn open_rejects_dangling_relations() {
        let temp = tempdir().expect("temp dir");
        let store = JsonFileStore::open(temp.path()).expect("open");
        let points = science();
        let relations = crate::extractor::analyze_relations(&points);
        assert!(!relations.is_empty());
        store.save_points(&points[2..]).expect("save points");
        store.save_relations(&relations).expect("save relations");

        let result = Library::open(Box::new(store), AnalysisConfig::default());
        assert!(matches!(result, Err(KenningError::InvalidReference { .. })));
    }

    #[test]
    fn add_points_rejects_duplicates_atomically() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        let err = library
            .add_points(vec![
                KnowledgePoint::new("new", "x"),
                KnowledgePoint::new("atoms", "again"),
            ])
            .expect_err("duplicate");
        assert!(matches!(err, KenningError::DuplicatePoint(_)));
        assert_eq!(library.points().len(), 3);
    }

    #[test]
    fn merge_points_skips_existing() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        let summary = library
            .merge_points(vec![
                KnowledgePoint::new("atoms", "again"),
                KnowledgePoint::new("ions", "charged atoms"),
            ])
            .expect("merge");
        assert_eq!(summary.points_added, 1);
        assert_eq!(summary.points_skipped, 1);
        assert_eq!(library.points().len(), 4);
    }

    #[test]
    fn analyze_replaces_relations() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        library
            .create_relation(
                &PointId::new("atoms"),
                &PointId::new("reactions"),
                RelationType::Prerequisite,
                0.9,
                None,
            )
            .expect("relate");
        let count = library.analyze().expect("analyze");
        assert_eq!(library.relations().len(), count);
        assert!(
            library
                .relations()
                .iter()
                .all(|r| r.id.as_str().starts_with("similar-")
                    || r.id.as_str().starts_with("tags-"))
        );
    }

    #[test]
    fn create_relation_validates_references() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        let err = library
            .create_relation(
                &PointId::new("atoms"),
                &PointId::new("ghost"),
                RelationType::Similar,
                0.5,
                None,
            )
            .expect_err("invalid");
        assert!(matches!(err, KenningError::InvalidReference { .. }));
        assert!(library.relations().is_empty());
    }

    #[test]
    fn remove_point_drops_touching_relations() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        library
            .create_relation(
                &PointId::new("atoms"),
                &PointId::new("bonds"),
                RelationType::Prerequisite,
                1.0,
                None,
            )
            .expect("relate");
        library.remove_point(&PointId::new("bonds")).expect("remove");
        assert!(library.relations().is_empty());
        assert!(matches!(
            library.get_point(&PointId::new("bonds")),
            Err(KenningError::PointNotFound(_))
        ));
    }

    #[test]
    fn replace_relations_rejects_dangling() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        let other = vec![
            KnowledgePoint::new("atoms", "x"),
            KnowledgePoint::new("elsewhere", "y"),
        ];
        let foreign = create_relation(
            &other,
            &PointId::new("atoms"),
            &PointId::new("elsewhere"),
            RelationType::Similar,
            1.0,
            None,
        )
        .expect("relation");
        assert!(library.replace_relations(vec![foreign]).is_err());
    }

    #[test]
    fn learning_path_and_wrappers() {
        let mut library = Library::new();
        library.add_points(science()).expect("add");
        library
            .create_relation(
                &PointId::new("atoms"),
                &PointId::new("bonds"),
                RelationType::Prerequisite,
                1.0,
                None,
            )
            .expect("relate");
        library
            .create_relation(
                &PointId::new("bonds"),
                &PointId::new("reactions"),
                RelationType::Prerequisite,
                1.0,
                None,
            )
            .expect("relate");

        let path = library
            .learning_path(&[PointId::new("reactions")], true)
            .expect("path");
        let ids: Vec<_> = path.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["atoms", "bonds", "reactions"]);
        assert_eq!(library.key_points(1), vec![PointId::new("bonds")]);
        assert_eq!(library.graph(&RelationType::all()).node_count(), 3);
        assert_eq!(library.metrics().relation_count, 2);
        assert!(library.gaps().is_empty());
    }

    #[test]
    fn file_backed_library_persists_mutations() {
        let temp = tempdir().expect("temp dir");
        {
            let store = JsonFileStore::open(temp.path()).expect("open");
            let mut library =
                Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
            library.add_points(science()).expect("add");
            library.analyze().expect("analyze");
        }
        let store = JsonFileStore::open(temp.path()).expect("reopen");
        let library = Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
        assert_eq!(library.points().len(), 3);
        assert!(!library.relations().is_empty());
        assert_eq!(library.backend_name(), "file");
    }

    #[test]
    fn redb_backed_library_persists_mutations() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("kb.redb");
        {
            let store = RedbStore::open(&path).expect("open");
            let mut library =
                Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
            library.add_points(science()).expect("add");
            library.remove_point(&PointId::new("reactions")).expect("remove");
        }
        let store = RedbStore::open(&path).expect("reopen");
        let library = Library::open(Box::new(store), AnalysisConfig::default()).expect("library");
        assert_eq!(library.points().len(), 2);
        assert!(library.is_persistent());
    }

    #[test]
    fn import_merge_keeps_existing_points() {
        let mut source = Library::new();
        source.add_points(science()).expect("add");
        source.analyze().expect("analyze");
        let bundle = source.export_bundle();

        let mut target = Library::new();
        target
            .add_points(vec![KnowledgePoint::new("atoms", "local version")])
            .expect("add");
        let summary = target
            .import_bundle(bundle.clone(), ImportMode::Merge)
            .expect("merge");
        assert_eq!(summary.points_added, 2);
        assert_eq!(summary.points_skipped, 1);
        assert_eq!(summary.relations_added, bundle.relations.len());
        assert_eq!(
            target
                .get_point(&PointId::new("atoms"))
                .expect("atoms")
                .content,
            "local version"
        );

        let replaced = target
            .import_bundle(bundle, ImportMode::Replace)
            .expect("replace");
        assert_eq!(replaced.points_added, 3);
        assert_eq!(target.points(), source.points());
    }
}

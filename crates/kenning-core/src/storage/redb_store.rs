//! # Redb Storage Backend
//!
//! One table, `collections`, mapping a collection key to the
//! `postcard`-encoded collection. Each save is a single write transaction.

use super::{Collection, KnowledgeRepository};
use crate::{KenningError, KnowledgePoint, KnowledgeRelation};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Collection key -> postcard blob.
const COLLECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// A disk-backed repository using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KenningError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| KenningError::IoError(e.to_string()))?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| KenningError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(COLLECTIONS)
                .map_err(|e| KenningError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| KenningError::IoError(e.to_string()))?;
        }

        Ok(Self { db })
    }

    fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, KenningError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KenningError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(COLLECTIONS)
            .map_err(|e| KenningError::IoError(e.to_string()))?;

        match table
            .get(collection.key())
            .map_err(|e| KenningError::IoError(e.to_string()))?
        {
            Some(blob) => postcard::from_bytes(blob.value()).map_err(|e| {
                KenningError::DeserializationError(format!("{}: {}", collection.key(), e))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<(), KenningError> {
        self.write_blobs(&[(collection, encode(items)?)])
    }

    /// Insert every blob inside one write transaction.
    fn write_blobs(&self, blobs: &[(Collection, Vec<u8>)]) -> Result<(), KenningError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KenningError::IoError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(COLLECTIONS)
                .map_err(|e| KenningError::IoError(e.to_string()))?;
            for (collection, blob) in blobs {
                table
                    .insert(collection.key(), blob.as_slice())
                    .map_err(|e| KenningError::IoError(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| KenningError::IoError(e.to_string()))
    }
}

fn encode<T: Serialize>(items: &[T]) -> Result<Vec<u8>, KenningError> {
    postcard::to_allocvec(items).map_err(|e| KenningError::SerializationError(e.to_string()))
}

impl KnowledgeRepository for RedbStore {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    fn load_points(&self) -> Result<Vec<KnowledgePoint>, KenningError> {
        self.read(Collection::Points)
    }

    fn save_points(&self, points: &[KnowledgePoint]) -> Result<(), KenningError> {
        self.write(Collection::Points, points)
    }

    fn load_relations(&self) -> Result<Vec<KnowledgeRelation>, KenningError> {
        self.read(Collection::Relations)
    }

    fn save_relations(&self, relations: &[KnowledgeRelation]) -> Result<(), KenningError> {
        self.write(Collection::Relations, relations)
    }

    fn save_all(
        &self,
        points: &[KnowledgePoint],
        relations: &[KnowledgeRelation],
    ) -> Result<(), KenningError> {
        self.write_blobs(&[
            (Collection::Points, encode(points)?),
            (Collection::Relations, encode(relations)?),
        ])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceType;
    use crate::extractor::analyze_relations;
    use tempfile::tempdir;

    fn sample() -> Vec<KnowledgePoint> {
        vec![
            KnowledgePoint::new("kp-1", "vector spaces and linear maps")
                .with_category("algebra")
                .with_tags(["linear", "basics"])
                .with_source("lecture-01.pdf", SourceType::Pdf),
            KnowledgePoint::new("kp-2", "vector spaces and linear maps")
                .with_category("algebra")
                .with_tags(["linear", "basics"]),
        ]
    }

    #[test]
    fn fresh_database_is_empty() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("kb.redb")).expect("open");
        assert!(store.load_points().expect("points").is_empty());
        assert!(store.load_relations().expect("relations").is_empty());
    }

    #[test]
    fn collections_survive_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("kb.redb");
        let points = sample();
        let relations = analyze_relations(&points);

        {
            let store = RedbStore::open(&path).expect("open");
            store.save_points(&points).expect("save points");
            store.save_relations(&relations).expect("save relations");
        }

        let store = RedbStore::open(&path).expect("reopen");
        assert_eq!(store.load_points().expect("load"), points);
        assert_eq!(store.load_relations().expect("load"), relations);
    }

    #[test]
    fn save_all_writes_both_collections() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("kb.redb")).expect("open");
        let points = sample();
        let relations = analyze_relations(&points);
        store.save_all(&points, &relations).expect("save");

        assert_eq!(store.load_points().expect("load"), points);
        assert_eq!(store.load_relations().expect("load"), relations);
    }

    #[test]
    fn save_replaces_collection() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("kb.redb")).expect("open");
        store.save_points(&sample()).expect("save");
        store.save_points(&sample()[..1]).expect("save again");
        assert_eq!(store.load_points().expect("load").len(), 1);
    }
}

//! # Storage
//!
//! Persistence for a working set. The analysis modules never touch storage;
//! only [`crate::library::Library`] loads and saves through a
//! [`KnowledgeRepository`].
//!
//! ## Backends
//!
//! - `JsonFileStore`: a directory with one pretty-printed JSON file per
//!   collection (human-editable, diff-friendly)
//! - `RedbStore`: a single `redb` database holding `postcard` blobs keyed by
//!   collection name (ACID writes)

mod json_store;
mod redb_store;

pub use json_store::JsonFileStore;
pub use redb_store::RedbStore;

use crate::{KenningError, KnowledgePoint, KnowledgeRelation};

/// A named collection inside a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Points,
    Relations,
}

impl Collection {
    /// Storage key of the collection.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Collection::Points => "knowledge_points",
            Collection::Relations => "relations",
        }
    }
}

/// Load/save access to persisted points and relations.
///
/// Saving replaces the whole collection. A collection that was never saved
/// loads as empty.
pub trait KnowledgeRepository: Send + Sync {
    /// Short backend name for status output.
    fn backend_name(&self) -> &'static str;

    fn load_points(&self) -> Result<Vec<KnowledgePoint>, KenningError>;

    fn save_points(&self, points: &[KnowledgePoint]) -> Result<(), KenningError>;

    fn load_relations(&self) -> Result<Vec<KnowledgeRelation>, KenningError>;

    fn save_relations(&self, relations: &[KnowledgeRelation]) -> Result<(), KenningError>;

    /// Save both collections at once. On error neither collection changes.
    fn save_all(
        &self,
        points: &[KnowledgePoint],
        relations: &[KnowledgeRelation],
    ) -> Result<(), KenningError>;
}

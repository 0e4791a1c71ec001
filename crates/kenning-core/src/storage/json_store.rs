//! JSON file backend: `<dir>/knowledge_points.json` and `<dir>/relations.json`.

use super::{Collection, KnowledgeRepository};
use crate::{KenningError, KnowledgePoint, KnowledgeRelation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory-backed repository writing one JSON array per collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, KenningError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| KenningError::IoError(format!("Create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The directory holding the collection files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }

    fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, KenningError> {
        let path = self.path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(&path)
            .map_err(|e| KenningError::IoError(format!("Read {}: {}", path.display(), e)))?;
        serde_json::from_slice(&data).map_err(|e| {
            KenningError::DeserializationError(format!("{}: {}", collection.key(), e))
        })
    }

    /// Serialize `items` into the collection's temporary file.
    fn stage<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<PathBuf, KenningError> {
        let tmp = self.dir.join(format!("{}.json.tmp", collection.key()));
        let data = serde_json::to_vec_pretty(items)
            .map_err(|e| KenningError::SerializationError(e.to_string()))?;
        std::fs::write(&tmp, &data)
            .map_err(|e| KenningError::IoError(format!("Write {}: {}", tmp.display(), e)))?;
        Ok(tmp)
    }

    fn publish(&self, collection: Collection, tmp: &Path) -> Result<(), KenningError> {
        let path = self.path(collection);
        std::fs::rename(tmp, &path)
            .map_err(|e| KenningError::IoError(format!("Rename {}: {}", path.display(), e)))
    }

    /// Write through a temporary file and rename, so a crash never leaves a
    /// half-written collection behind.
    fn write<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<(), KenningError> {
        let tmp = self.stage(collection, items)?;
        self.publish(collection, &tmp)
    }
}

impl KnowledgeRepository for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "file"
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

    /// Both temporary files are written before either is renamed into place.
    fn save_all(
        &self,
        points: &[KnowledgePoint],
        relations: &[KnowledgeRelation],
    ) -> Result<(), KenningError> {
        let points_tmp = self.stage(Collection::Points, points)?;
        let relations_tmp = match self.stage(Collection::Relations, relations) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = std::fs::remove_file(&points_tmp);
                return Err(e);
            }
        };
        self.publish(Collection::Points, &points_tmp)?;
        self.publish(Collection::Relations, &relations_tmp)
    }
}

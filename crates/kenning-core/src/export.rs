//! # Export Bundle
//!
//! Portable backups of a working set.
//!
//! An [`ExportBundle`] carries a format version, the export time, the points
//! and the relations. It has two encodings:
//!
//! - **Binary**: `[header_len: u32 LE] [BundleHeader (postcard)] [bundle (postcard)]`.
//!   The header holds magic bytes, a version, the counts and an FNV-1a
//!   checksum of the bundle bytes, all checked before the bundle is decoded.
//! - **JSON**: the bundle as a pretty-printed object, matching the backup
//!   files older releases wrote (`version`, `exportDate` accepted as alias).
//!
//! Encoding the same bundle twice yields identical bytes.

use crate::primitives::{MAX_IMPORT_POINTS, MAX_IMPORT_RELATIONS};
use crate::{KenningError, KnowledgePoint, KnowledgeRelation, PointId, RelationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// FORMAT
// =============================================================================

/// Magic bytes of the binary format.
pub const BUNDLE_MAGIC: [u8; 4] = *b"KNEX";

/// Current binary format version.
pub const BUNDLE_FORMAT_VERSION: u8 = 1;

/// Version string written into new bundles.
pub const BUNDLE_VERSION: &str = "1.0.0";

/// Header of the binary format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub point_count: u64,
    pub relation_count: u64,
    /// FNV-1a over the encoded bundle.
    pub checksum: u64,
}

impl BundleHeader {
    #[must_use]
    pub fn new(point_count: u64, relation_count: u64, checksum: u64) -> Self {
        Self {
            magic: BUNDLE_MAGIC,
            version: BUNDLE_FORMAT_VERSION,
            point_count,
            relation_count,
            checksum,
        }
    }

    /// Validate magic, version and count limits.
    ///
    /// Messages stay generic so corrupt input reveals little about the format.
    pub fn validate(&self) -> Result<(), KenningError> {
        if self.magic != BUNDLE_MAGIC {
            return Err(KenningError::DeserializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != BUNDLE_FORMAT_VERSION {
            return Err(KenningError::DeserializationError(
                "Unsupported file version".to_string(),
            ));
        }
        if self.point_count > MAX_IMPORT_POINTS as u64 {
            return Err(KenningError::DeserializationError(format!(
                "Point count {} exceeds maximum allowed {}",
                self.point_count, MAX_IMPORT_POINTS
            )));
        }
        if self.relation_count > MAX_IMPORT_RELATIONS as u64 {
            return Err(KenningError::DeserializationError(format!(
                "Relation count {} exceeds maximum allowed {}",
                self.relation_count, MAX_IMPORT_RELATIONS
            )));
        }
        Ok(())
    }
}

/// A complete backup of points and relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub version: String,
    /// Epoch milliseconds.
    #[serde(alias = "exportDate")]
    pub exported_at: u64,
    #[serde(alias = "knowledgePoints")]
    pub points: Vec<KnowledgePoint>,
    /// Absent from backups that predate stored relations.
    #[serde(default)]
    pub relations: Vec<KnowledgeRelation>,
}

impl ExportBundle {
    /// Create a bundle with the current version string.
    #[must_use]
    pub fn new(
        points: Vec<KnowledgePoint>,
        relations: Vec<KnowledgeRelation>,
        exported_at: u64,
    ) -> Self {
        Self {
            version: BUNDLE_VERSION.to_string(),
            exported_at,
            points,
            relations,
        }
    }

    /// Check internal consistency: unique point ids, unique relation ids,
    /// and every relation referencing two distinct points of the bundle.
    pub fn validate(&self) -> Result<(), KenningError> {
        if self.points.len() > MAX_IMPORT_POINTS || self.relations.len() > MAX_IMPORT_RELATIONS {
            return Err(KenningError::InvalidArgument(
                "Bundle exceeds import limits".to_string(),
            ));
        }

        let mut ids: BTreeSet<&PointId> = BTreeSet::new();
        for point in &self.points {
            if !ids.insert(&point.id) {
                return Err(KenningError::DuplicatePoint(point.id.clone()));
            }
        }

        let mut relation_ids: BTreeSet<&RelationId> = BTreeSet::new();
        for relation in &self.relations {
            if relation.source_id == relation.target_id
                || !ids.contains(&relation.source_id)
                || !ids.contains(&relation.target_id)
            {
                return Err(KenningError::InvalidReference {
                    from: relation.source_id.clone(),
                    to: relation.target_id.clone(),
                });
            }
            if !relation_ids.insert(&relation.id) {
                return Err(KenningError::InvalidArgument(format!(
                    "Duplicate relation id: {}",
                    relation.id
                )));
            }
        }
        Ok(())
    }
}

/// 64-bit FNV-1a.
///
/// Detects accidental corruption only; it is not collision resistant. Use
/// the `crypto-hash` feature for a BLAKE3 digest.
#[must_use]
pub fn fnv1a(data: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    data.iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

// =============================================================================
// BINARY
// =============================================================================

/// Encode a bundle in the binary format.
pub fn export_binary(bundle: &ExportBundle) -> Result<Vec<u8>, KenningError> {
    let data_bytes = postcard::to_allocvec(bundle)
        .map_err(|e| KenningError::SerializationError(format!("Data: {}", e)))?;

    let header = BundleHeader::new(
        bundle.points.len() as u64,
        bundle.relations.len() as u64,
        fnv1a(&data_bytes),
    );
    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| KenningError::SerializationError(format!("Header: {}", e)))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + data_bytes.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&data_bytes);
    Ok(result)
}

/// Decode and validate a binary bundle.
pub fn import_binary(data: &[u8]) -> Result<ExportBundle, KenningError> {
    let Some((len_bytes, rest)) = data.split_first_chunk::<4>() else {
        return Err(KenningError::DeserializationError(
            "Data too short".to_string(),
        ));
    };
    let header_len = u32::from_le_bytes(*len_bytes) as usize;
    if rest.len() < header_len {
        return Err(KenningError::DeserializationError(
            "Data too short for header".to_string(),
        ));
    }
    let (header_bytes, data_bytes) = rest.split_at(header_len);

    let header: BundleHeader = postcard::from_bytes(header_bytes)
        .map_err(|e| KenningError::DeserializationError(format!("Header: {}", e)))?;
    header.validate()?;

    let computed = fnv1a(data_bytes);
    if computed != header.checksum {
        return Err(KenningError::DeserializationError(format!(
            "Checksum mismatch: expected {}, got {}",
            header.checksum, computed
        )));
    }

    let bundle: ExportBundle = postcard::from_bytes(data_bytes)
        .map_err(|e| KenningError::DeserializationError(format!("Data: {}", e)))?;

    if bundle.points.len() as u64 != header.point_count {
        return Err(KenningError::DeserializationError(
            "Point count mismatch".to_string(),
        ));
    }
    if bundle.relations.len() as u64 != header.relation_count {
        return Err(KenningError::DeserializationError(
            "Relation count mismatch".to_string(),
        ));
    }

    bundle.validate()?;
    Ok(bundle)
}

// =============================================================================
// JSON
// =============================================================================

/// Encode a bundle as pretty-printed JSON.
pub fn export_json(bundle: &ExportBundle) -> Result<Vec<u8>, KenningError> {
    serde_json::to_vec_pretty(bundle).map_err(|e| KenningError::SerializationError(e.to_string()))
}

/// Decode and validate a JSON bundle.
pub fn import_json(data: &[u8]) -> Result<ExportBundle, KenningError> {
    let bundle: ExportBundle = serde_json::from_slice(data)
        .map_err(|e| KenningError::DeserializationError(e.to_string()))?;
    bundle.validate()?;
    Ok(bundle)
}

// =============================================================================
// CRYPTOGRAPHIC HASH
// =============================================================================

/// BLAKE3 digest of an encoded bundle, as 64 hex characters.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn bundle_crypto_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

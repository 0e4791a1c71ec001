//! # Core Type Definitions
//!
//! This module contains all core types for the Kenning analysis engine:
//! - Identifiers (`PointId`, `RelationId`)
//! - Knowledge points as supplied by the extraction collaborator (`KnowledgePoint`)
//! - Relations between points (`RelationType`, `Strength`, `KnowledgeRelation`)
//! - Error types (`KenningError`)
//!
//! ## Invariants
//!
//! - `Strength` is always within `[0, 1]`; clamping happens at construction
//!   and on deserialization, so stored data cannot violate it.
//! - Relations are never mutated after creation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier of a knowledge point within a working set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    /// Create a new point identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier of a relation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub String);

impl RelationId {
    /// Create a relation identifier from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier for a manually created relation.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("relation-{}", uuid::Uuid::new_v4()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// KNOWLEDGE POINT
// =============================================================================

/// Kind of document a knowledge point was extracted from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Ppt,
    Video,
    #[default]
    #[serde(other)]
    Other,
}

/// An atomic extracted fact or snippet.
///
/// Supplied by the extraction collaborator and treated as immutable by every
/// analysis. Only `id`, `content`, `tags`, `category` and `confidence` take
/// part in analysis; the remaining fields are provenance carried for display.
///
/// Field aliases accept the camelCase names used by older JSON exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePoint {
    pub id: PointId,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Classification key. The empty string is a valid "uncategorized" bucket.
    #[serde(default)]
    pub category: String,
    /// Provenance-quality signal, nominally in `[0, 1]`. Not validated.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "sourceType")]
    pub source_type: SourceType,
    #[serde(default)]
    pub page: Option<u32>,
    /// Offset in seconds for points extracted from video.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default, alias = "createdAt")]
    pub created_at: u64,
}

impl KnowledgePoint {
    /// Create a point with the given id and content and empty metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: PointId::new(id),
            content: content.into(),
            tags: Vec::new(),
            category: String::new(),
            confidence: 1.0,
            source: String::new(),
            source_type: SourceType::Other,
            page: None,
            timestamp: None,
            created_at: 0,
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the source document and its type.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>, source_type: SourceType) -> Self {
        self.source = source.into();
        self.source_type = source_type;
        self
    }

    /// Distinct tags in display order (first occurrence wins).
    #[must_use]
    pub fn distinct_tags(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

// =============================================================================
// RELATION TYPE
// =============================================================================

/// The kind of link between two knowledge points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Similar content.
    Similar,
    /// The source must be understood before the target.
    Prerequisite,
    /// The target extends the source.
    Extension,
    /// The two points contradict each other.
    Contradiction,
    /// The source is the parent topic of the target.
    ParentChild,
}

impl RelationType {
    /// Every relation type, in declaration order.
    pub const ALL: [RelationType; 5] = [
        RelationType::Similar,
        RelationType::Prerequisite,
        RelationType::Extension,
        RelationType::Contradiction,
        RelationType::ParentChild,
    ];

    /// The set of all relation types (no filtering).
    #[must_use]
    pub fn all() -> BTreeSet<RelationType> {
        Self::ALL.into_iter().collect()
    }

    /// Human-readable label used for graph edges.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RelationType::Similar => "Similar Content",
            RelationType::Prerequisite => "Prerequisite",
            RelationType::Extension => "Extension",
            RelationType::Contradiction => "Contradiction",
            RelationType::ParentChild => "Parent/Child",
        }
    }

    /// Stable machine name (matches the serialized form).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Similar => "similar",
            RelationType::Prerequisite => "prerequisite",
            RelationType::Extension => "extension",
            RelationType::Contradiction => "contradiction",
            RelationType::ParentChild => "parent_child",
        }
    }

    /// Whether this relation orders learning (target depends on source).
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, RelationType::Prerequisite | RelationType::ParentChild)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = KenningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "similar" => Ok(RelationType::Similar),
            "prerequisite" => Ok(RelationType::Prerequisite),
            "extension" => Ok(RelationType::Extension),
            "contradiction" => Ok(RelationType::Contradiction),
            "parent_child" | "parentchild" => Ok(RelationType::ParentChild),
            other => Err(KenningError::InvalidArgument(format!(
                "Unknown relation type: {other}"
            ))),
        }
    }
}

// =============================================================================
// STRENGTH
// =============================================================================

/// Relation strength, always within `[0, 1]`.
///
/// Out-of-range input is clamped; NaN becomes 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Strength(f64);

impl Strength {
    /// Create a strength, clamping into `[0, 1]`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Strength {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Strength> for f64 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}

// =============================================================================
// KNOWLEDGE RELATION
// =============================================================================

/// A typed, weighted link between two knowledge points.
///
/// Directed by convention: for dependency types the source precedes the
/// target. Created by the relation extractor or by a validated manual
/// action (`extractor::create_relation`); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRelation {
    pub id: RelationId,
    #[serde(alias = "sourceId")]
    pub source_id: PointId,
    #[serde(alias = "targetId")]
    pub target_id: PointId,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub strength: Strength,
    #[serde(default)]
    pub description: Option<String>,
    /// Epoch milliseconds. Zero for derived relations.
    #[serde(default, alias = "createdAt")]
    pub created_at: u64,
}

impl KnowledgeRelation {
    /// Construct a relation without reference validation.
    pub(crate) fn new(
        id: RelationId,
        source_id: PointId,
        target_id: PointId,
        relation_type: RelationType,
        strength: f64,
        description: Option<String>,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            source_id,
            target_id,
            relation_type,
            strength: Strength::new(strength),
            description,
            created_at,
        }
    }

    /// Whether the relation touches the given point.
    #[must_use]
    pub fn touches(&self, id: &PointId) -> bool {
        &self.source_id == id || &self.target_id == id
    }
}

/// Current wall-clock time in epoch milliseconds (0 if the clock is before 1970).
#[must_use]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Kenning system.
///
/// - No silent failures on validated paths
/// - Use `Result<T, KenningError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum KenningError {
    /// Relation endpoints are unknown or identical.
    #[error("Invalid reference: {from} -> {to}")]
    InvalidReference { from: PointId, to: PointId },

    /// Dependency relations form a cycle (strict learning paths only).
    #[error("Cyclic dependency among {} points: {}", .0.len(), join_ids(.0))]
    CyclicDependency(Vec<PointId>),

    /// A point id appears more than once in a working set.
    #[error("Duplicate knowledge point: {0}")]
    DuplicatePoint(PointId),

    /// The requested point is not in the working set.
    #[error("Knowledge point not found: {0}")]
    PointNotFound(PointId),

    /// The point failed ingestion validation.
    #[error("Invalid knowledge point: {0}")]
    InvalidPoint(String),

    /// A caller-supplied argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

fn join_ids(ids: &[PointId]) -> String {
    ids.iter()
        .map(PointId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// =============================================================================
// TESTS
// =============================================================================

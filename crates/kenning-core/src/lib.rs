//! # kenning-core
//!
//! The knowledge-relation analysis engine for Kenning - THE LOGIC.
//!
//! Given knowledge points extracted from course material (text, tags,
//! category, confidence), this crate derives typed relations between them
//! and answers structural questions about the resulting graph:
//!
//! - `similarity` → token-overlap similarity scorer
//! - `extractor` → relation extraction (category and tag passes)
//! - `graph` → node/edge view filtered by relation type
//! - `ranking` → key points by degree centrality
//! - `gaps` → sparse/under-connected categories and isolated points
//! - `path` → dependency-respecting learning paths
//! - `recommend` → related points for a given point
//!
//! ## Architectural Constraints
//!
//! - Every analysis is a pure function over the slices it is given
//! - Identical inputs produce identical outputs, in the same order
//! - Only `Library` holds state; persistence sits behind `KnowledgeRepository`
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod export;
pub mod extractor;
pub mod gaps;
pub mod graph;
pub mod ingestor;
pub mod library;
pub mod metrics;
pub mod path;
pub mod primitives;
pub mod ranking;
pub mod recommend;
pub mod similarity;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    KenningError, KnowledgePoint, KnowledgeRelation, PointId, RelationId, RelationType,
    SourceType, Strength,
};

// =============================================================================
// RE-EXPORTS: Analysis
// =============================================================================

pub use config::{AnalysisConfig, DuplicatePolicy, RecommendWeights};
pub use extractor::{RelationExtractor, analyze_relations, create_relation};
pub use gaps::{GapFinding, GapKind, detect_gaps};
pub use graph::{GraphEdge, GraphNode, KnowledgeGraph, build_graph};
pub use metrics::GraphMetrics;
pub use path::{find_dependency_cycle, generate_path, generate_path_strict};
pub use ranking::find_key_points;
pub use recommend::{Recommendation, recommend_related};
pub use similarity::similarity;

// =============================================================================
// RE-EXPORTS: Working Set & Persistence
// =============================================================================

pub use export::{ExportBundle, export_binary, export_json, import_binary, import_json};
pub use ingestor::Ingestor;
pub use library::{ImportMode, Library, MergeSummary};
pub use storage::{JsonFileStore, KnowledgeRepository, RedbStore};

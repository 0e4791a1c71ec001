//! # Analysis Primitives
//!
//! Fixed constants for the Kenning core.
//!
//! Thresholds that tune analysis live in [`crate::config::AnalysisConfig`];
//! the values here are its defaults plus the hard limits that bound
//! validation and import.

// =============================================================================
// SIMILARITY
// =============================================================================

/// Minimum token length (in characters) kept by the tokenizer.
///
/// Tokens of length <= 2 are discarded.
pub const MIN_TOKEN_LEN: usize = 3;

/// Default content-similarity threshold for the category pass.
///
/// A pair must score strictly above this value.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Default tag-overlap threshold for the tag pass (strictly above).
pub const TAG_OVERLAP_THRESHOLD: f64 = 0.4;

/// Minimum number of shared tags before the tag pass emits a relation.
pub const MIN_COMMON_TAGS: usize = 2;

// =============================================================================
// GAPS & RANKING
// =============================================================================

/// Categories with fewer points than this are reported as sparse.
pub const SPARSE_CATEGORY_MIN: usize = 3;

/// Default number of key points returned by ranking.
pub const DEFAULT_KEY_POINT_LIMIT: usize = 5;

/// Default number of recommendations.
pub const DEFAULT_RECOMMEND_LIMIT: usize = 5;

// =============================================================================
// GRAPH VIEW
// =============================================================================

/// Node size hint: `confidence * NODE_VALUE_SCALE`.
pub const NODE_VALUE_SCALE: f64 = 10.0;

/// Edge weight hint: `strength * EDGE_VALUE_SCALE`.
pub const EDGE_VALUE_SCALE: f64 = 3.0;

/// Number of content characters shown in a node label before truncation.
pub const NODE_LABEL_CHARS: usize = 20;

// =============================================================================
// COMPLEXITY BOUND
// =============================================================================

/// Documented working-set bound for the O(n²) extraction passes.
///
/// Larger inputs are still analyzed, but a warning is logged.
pub const MAX_ANALYSIS_POINTS: usize = 2000;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for point ids.
pub const MAX_ID_LENGTH: usize = 256;

/// Maximum length for point content (64KB).
pub const MAX_CONTENT_LENGTH: usize = 65536;

/// Maximum number of tags on a single point.
pub const MAX_TAGS: usize = 64;

/// Maximum length of a single tag or category.
pub const MAX_TAG_LENGTH: usize = 256;

/// Maximum number of points accepted by a single import or ingestion call.
pub const MAX_IMPORT_POINTS: usize = 100_000;

/// Maximum number of relations accepted by a single import.
pub const MAX_IMPORT_RELATIONS: usize = 1_000_000;

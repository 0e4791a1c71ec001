//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every response carries `success` and an optional `error`; the HTTP status
//! code says which class of failure occurred.

use kenning_core::{
    GapFinding, ImportMode, KnowledgeGraph, KnowledgePoint, KnowledgeRelation, MergeSummary,
    PointId, RelationType, Recommendation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Working-set status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub point_count: usize,
    pub relation_count: usize,
    pub category_count: usize,
    pub isolated_count: usize,
    pub density_millionths: u64,
    #[serde(default)]
    pub by_type: BTreeMap<RelationType, usize>,
}

// =============================================================================
// POINTS
// =============================================================================

/// Request to add knowledge points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPointsRequest {
    pub points: Vec<KnowledgePoint>,
    /// Skip ids that already exist instead of rejecting the batch.
    #[serde(default)]
    pub merge: bool,
}

/// Result of adding points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddPointsResponse {
    pub success: bool,
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
    pub error: Option<String>,
}

impl AddPointsResponse {
    pub fn success(added: usize, skipped: usize, total: usize) -> Self {
        Self {
            success: true,
            added,
            skipped,
            total,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

/// Listing of all points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsResponse {
    pub total: usize,
    pub points: Vec<KnowledgePoint>,
}

/// A single point, or why it could not be returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointResponse {
    pub success: bool,
    pub point: Option<KnowledgePoint>,
    pub error: Option<String>,
}

impl PointResponse {
    pub fn success(point: KnowledgePoint) -> Self {
        Self {
            success: true,
            point: Some(point),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// RELATIONS
// =============================================================================

fn default_strength() -> f64 {
    1.0
}

/// Manual relation creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationRequest {
    #[serde(alias = "sourceId")]
    pub source_id: PointId,
    #[serde(alias = "targetId")]
    pub target_id: PointId,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A single relation, or why it could not be created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationResponse {
    pub success: bool,
    pub relation: Option<KnowledgeRelation>,
    pub error: Option<String>,
}

impl RelationResponse {
    pub fn success(relation: KnowledgeRelation) -> Self {
        Self {
            success: true,
            relation: Some(relation),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

/// Listing of all relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsResponse {
    pub total: usize,
    pub relations: Vec<KnowledgeRelation>,
}

// =============================================================================
// ANALYZE
// =============================================================================

/// Outcome of re-deriving relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub relation_count: usize,
    pub by_type: BTreeMap<RelationType, usize>,
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn success(relation_count: usize, by_type: BTreeMap<RelationType, usize>) -> Self {
        Self {
            success: true,
            relation_count,
            by_type,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Graph view request. Omitted `types` means every relation type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphRequest {
    #[serde(default)]
    pub types: Option<Vec<RelationType>>,
}

/// Graph view response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub node_count: usize,
    pub edge_count: usize,
    pub graph: KnowledgeGraph,
}

// =============================================================================
// KEY POINTS
// =============================================================================

/// `?limit=` for `/key-points` and the default for `/recommend`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// A ranked point with its degree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPointJson {
    pub id: PointId,
    pub degree: usize,
}

/// Key points response, highest degree first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPointsResponse {
    pub points: Vec<KeyPointJson>,
}

// =============================================================================
// GAPS
// =============================================================================

/// Gap findings plus a readable message per finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapsResponse {
    pub findings: Vec<GapFinding>,
    pub messages: Vec<String>,
}

impl GapsResponse {
    #[must_use]
    pub fn new(findings: Vec<GapFinding>) -> Self {
        let messages = findings.iter().map(ToString::to_string).collect();
        Self { findings, messages }
    }
}

// =============================================================================
// LEARNING PATH
// =============================================================================

/// Learning path request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub targets: Vec<PointId>,
    /// Reject cyclic dependencies instead of approximating.
    #[serde(default)]
    pub strict: bool,
}

/// Learning path response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathResponse {
    pub success: bool,
    pub path: Vec<KnowledgePoint>,
    /// The offending cycle when a strict request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub cycle: Option<Vec<PointId>>,
    pub error: Option<String>,
}

impl PathResponse {
    pub fn success(path: Vec<KnowledgePoint>) -> Self {
        Self {
            success: true,
            path,
            ..Self::default()
        }
    }

    pub fn error(msg: impl Into<String>, cycle: Option<Vec<PointId>>) -> Self {
        Self {
            cycle,
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// RECOMMEND
// =============================================================================

/// Recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(alias = "pointId")]
    pub point_id: PointId,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Recommendations, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub error: Option<String>,
}

impl RecommendResponse {
    pub fn success(recommendations: Vec<Recommendation>) -> Self {
        Self {
            success: true,
            recommendations,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

/// `?format=` for `/export`: `binary` (default) or `json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub format: Option<String>,
    pub data: Option<String>, // Base64 encoded
    /// BLAKE3 of the decoded `data`.
    pub hash: Option<String>,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(format: &str, data: &[u8], hash: String) -> Self {
        Self {
            success: true,
            format: Some(format.to_string()),
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                data,
            )),
            hash: Some(hash),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            format: None,
            data: None,
            hash: None,
            error: Some(msg.into()),
        }
    }
}

/// Import request: a base64 bundle in either format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub data: String,
    #[serde(default)]
    pub mode: ImportMode,
}

/// Import response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    pub summary: Option<MergeSummary>,
    pub error: Option<String>,
}

impl ImportResponse {
    pub fn success(summary: MergeSummary) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// HASH RESPONSE
// =============================================================================

/// Content hash response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub success: bool,
    pub hash: Option<String>,
    pub algorithm: String,
    pub error: Option<String>,
}

impl HashResponse {
    pub fn success(hash: String) -> Self {
        Self {
            success: true,
            hash: Some(hash),
            algorithm: "blake3".to_string(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            hash: None,
            algorithm: "blake3".to_string(),
            error: Some(msg.into()),
        }
    }
}

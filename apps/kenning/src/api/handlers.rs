//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        AddPointsRequest, AddPointsResponse, AnalyzeResponse, CreateRelationRequest,
        ExportQuery, ExportResponse, GapsResponse, GraphRequest, GraphResponse, HashResponse,
        HealthResponse, ImportRequest, ImportResponse, KeyPointJson, KeyPointsResponse,
        LimitQuery, PathRequest, PathResponse, PointResponse, PointsResponse, RecommendRequest,
        RecommendResponse, RelationResponse, RelationsResponse, StatusResponse,
    },
};
use crate::cli::decode_bundle;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use kenning_core::{
    KenningError, KnowledgePoint, PointId, RelationType,
    export::{bundle_crypto_hash, export_binary, export_json},
    primitives::{DEFAULT_KEY_POINT_LIMIT, DEFAULT_RECOMMEND_LIMIT, MAX_IMPORT_POINTS},
    ranking::degree_counts,
};
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound for `limit` parameters.
const MAX_LIMIT: usize = 1000;

/// Map a core error to an HTTP status.
///
/// - 400: the request itself is invalid
/// - 404: a referenced point does not exist
/// - 500: storage or encoding failed
#[must_use]
pub fn error_status(error: &KenningError) -> StatusCode {
    match error {
        KenningError::InvalidReference { .. }
        | KenningError::CyclicDependency(_)
        | KenningError::DuplicatePoint(_)
        | KenningError::InvalidPoint(_)
        | KenningError::InvalidArgument(_)
        | KenningError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        KenningError::PointNotFound(_) => StatusCode::NOT_FOUND,
        KenningError::SerializationError(_) | KenningError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).min(MAX_LIMIT)
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get working-set status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    let metrics = library.metrics();

    let response = StatusResponse {
        backend: library.backend_name().to_string(),
        point_count: metrics.point_count,
        relation_count: metrics.relation_count,
        category_count: metrics.category_count,
        isolated_count: metrics.isolated_count,
        density_millionths: metrics.density_millionths,
        by_type: metrics.by_type,
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// POINT HANDLERS
// =============================================================================

/// List all points.
pub async fn list_points_handler(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    Json(PointsResponse {
        total: library.points().len(),
        points: library.points().to_vec(),
    })
}

/// Add a batch of points.
pub async fn add_points_handler(
    State(state): State<AppState>,
    Json(request): Json<AddPointsRequest>,
) -> impl IntoResponse {
    if request.points.len() > MAX_IMPORT_POINTS {
        return (
            StatusCode::BAD_REQUEST,
            Json(AddPointsResponse::error(format!(
                "Point count {} exceeds maximum {}",
                request.points.len(),
                MAX_IMPORT_POINTS
            ))),
        );
    }

    let mut library = state.library.write().await;
    let result = if request.merge {
        library
            .merge_points(request.points)
            .map(|s| (s.points_added, s.points_skipped))
    } else {
        library.add_points(request.points).map(|added| (added, 0))
    };

    match result {
        Ok((added, skipped)) => (
            StatusCode::OK,
            Json(AddPointsResponse::success(
                added,
                skipped,
                library.points().len(),
            )),
        ),
        Err(e) => (
            error_status(&e),
            Json(AddPointsResponse::error(format!("Add points failed: {}", e))),
        ),
    }
}

/// Fetch one point.
pub async fn get_point_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let library = state.library.read().await;
    match library.get_point(&PointId::new(id)) {
        Ok(point) => (StatusCode::OK, Json(PointResponse::success(point.clone()))),
        Err(e) => (error_status(&e), Json(PointResponse::error(e.to_string()))),
    }
}

/// Replace a point in place. The body id must match the path id.
pub async fn update_point_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(point): Json<KnowledgePoint>,
) -> impl IntoResponse {
    if point.id.as_str() != id {
        return (
            StatusCode::BAD_REQUEST,
            Json(PointResponse::error(format!(
                "Body id '{}' does not match path id '{}'",
                point.id, id
            ))),
        );
    }

    let mut library = state.library.write().await;
    match library.update_point(point.clone()) {
        Ok(()) => (StatusCode::OK, Json(PointResponse::success(point))),
        Err(e) => (
            error_status(&e),
            Json(PointResponse::error(format!("Update failed: {}", e))),
        ),
    }
}

/// Remove a point and its relations.
pub async fn delete_point_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut library = state.library.write().await;
    match library.remove_point(&PointId::new(id)) {
        Ok(point) => (StatusCode::OK, Json(PointResponse::success(point))),
        Err(e) => (
            error_status(&e),
            Json(PointResponse::error(format!("Remove failed: {}", e))),
        ),
    }
}

// =============================================================================
// RELATION HANDLERS
// =============================================================================

/// List all relations.
pub async fn list_relations_handler(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    Json(RelationsResponse {
        total: library.relations().len(),
        relations: library.relations().to_vec(),
    })
}

/// Create a relation by hand.
pub async fn create_relation_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateRelationRequest>,
) -> impl IntoResponse {
    let mut library = state.library.write().await;
    match library.create_relation(
        &request.source_id,
        &request.target_id,
        request.relation_type,
        request.strength,
        request.description,
    ) {
        Ok(relation) => (StatusCode::OK, Json(RelationResponse::success(relation))),
        Err(e) => (
            error_status(&e),
            Json(RelationResponse::error(format!(
                "Create relation failed: {}",
                e
            ))),
        ),
    }
}

// =============================================================================
// ANALYZE HANDLER
// =============================================================================

/// Re-derive every relation from the current points.
pub async fn analyze_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut library = state.library.write().await;
    match library.analyze() {
        Ok(count) => (
            StatusCode::OK,
            Json(AnalyzeResponse::success(count, library.metrics().by_type)),
        ),
        Err(e) => (
            error_status(&e),
            Json(AnalyzeResponse::error(format!("Analyze failed: {}", e))),
        ),
    }
}

// =============================================================================
// GRAPH HANDLER
// =============================================================================

/// Graph view filtered by relation type.
pub async fn graph_handler(
    State(state): State<AppState>,
    Json(request): Json<GraphRequest>,
) -> impl IntoResponse {
    let active: BTreeSet<RelationType> = match request.types {
        Some(types) => types.into_iter().collect(),
        None => RelationType::all(),
    };

    let library = state.library.read().await;
    let graph = library.graph(&active);
    Json(GraphResponse {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        graph,
    })
}

// =============================================================================
// KEY POINTS HANDLER
// =============================================================================

/// Key points by degree.
pub async fn key_points_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = clamp_limit(query.limit, DEFAULT_KEY_POINT_LIMIT);
    let library = state.library.read().await;
    let degrees: BTreeMap<PointId, usize> =
        degree_counts(library.relations()).into_iter().collect();

    let points = library
        .key_points(limit)
        .into_iter()
        .map(|id| {
            let degree = degrees.get(&id).copied().unwrap_or(0);
            KeyPointJson { id, degree }
        })
        .collect();

    Json(KeyPointsResponse { points })
}

// =============================================================================
// GAPS HANDLER
// =============================================================================

/// Structural gap findings.
pub async fn gaps_handler(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    Json(GapsResponse::new(library.gaps()))
}

// =============================================================================
// PATH HANDLER
// =============================================================================

/// Learning path to the requested targets.
pub async fn path_handler(
    State(state): State<AppState>,
    Json(request): Json<PathRequest>,
) -> impl IntoResponse {
    if request.targets.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PathResponse::error("At least one target is required", None)),
        );
    }

    let library = state.library.read().await;
    match library.learning_path(&request.targets, request.strict) {
        Ok(path) => (StatusCode::OK, Json(PathResponse::success(path))),
        Err(e) => {
            let cycle = match &e {
                KenningError::CyclicDependency(cycle) => Some(cycle.clone()),
                _ => None,
            };
            (
                error_status(&e),
                Json(PathResponse::error(e.to_string(), cycle)),
            )
        }
    }
}

// =============================================================================
// RECOMMEND HANDLER
// =============================================================================

/// Points related to a given point.
pub async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> impl IntoResponse {
    let limit = clamp_limit(request.limit, DEFAULT_RECOMMEND_LIMIT);
    let library = state.library.read().await;

    if let Err(e) = library.get_point(&request.point_id) {
        return (
            error_status(&e),
            Json(RecommendResponse::error(e.to_string())),
        );
    }

    let recommendations = library.recommend(&request.point_id, limit);
    (
        StatusCode::OK,
        Json(RecommendResponse::success(recommendations)),
    )
}

// =============================================================================
// EXPORT / IMPORT HANDLERS
// =============================================================================

/// Export the working set as a base64 bundle.
pub async fn export_handler(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let format = query.format.as_deref().unwrap_or("binary");
    let library = state.library.read().await;
    let bundle = library.export_bundle();

    let encoded = match format {
        "binary" => export_binary(&bundle),
        "json" => export_json(&bundle),
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ExportResponse::error(format!(
                    "Unknown format: {}. Use: binary, json",
                    other
                ))),
            );
        }
    };

    match encoded {
        Ok(data) => {
            let hash = bundle_crypto_hash(&data);
            (
                StatusCode::OK,
                Json(ExportResponse::success(format, &data, hash)),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}

/// Import a base64 bundle.
pub async fn import_handler(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> impl IntoResponse {
    let data = match base64::engine::general_purpose::STANDARD.decode(request.data.as_bytes()) {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ImportResponse::error(format!("Invalid base64: {}", e))),
            );
        }
    };

    let bundle = match decode_bundle(&data) {
        Ok(b) => b,
        Err(e) => {
            return (
                error_status(&e),
                Json(ImportResponse::error(format!("Invalid bundle: {}", e))),
            );
        }
    };

    let mut library = state.library.write().await;
    match library.import_bundle(bundle, request.mode) {
        Ok(summary) => (StatusCode::OK, Json(ImportResponse::success(summary))),
        Err(e) => (
            error_status(&e),
            Json(ImportResponse::error(format!("Import failed: {}", e))),
        ),
    }
}

// =============================================================================
// HASH HANDLER
// =============================================================================

/// BLAKE3 content hash of the working set.
pub async fn hash_handler(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    match library.content_hash() {
        Ok(hash) => (StatusCode::OK, Json(HashResponse::success(hash))),
        Err(e) => (
            error_status(&e),
            Json(HashResponse::error(format!("Hash failed: {}", e))),
        ),
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{Backend, BundleFormat, FileConfig};
use crate::api;
use kenning_core::{
    ExportBundle, ImportMode, JsonFileStore, KenningError, KnowledgePoint, KnowledgeRepository,
    Library, PointId, RedbStore, RelationType, export_binary, export_json, import_binary,
    import_json, primitives::MAX_IMPORT_POINTS, ranking::degree_counts,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for ingestion (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum file size for import (500 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), KenningError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| KenningError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(KenningError::InvalidArgument(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path: canonicalized, existing, and a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, KenningError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        KenningError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(KenningError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, KenningError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        KenningError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(KenningError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| KenningError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub backend: Backend,
    pub json_mode: bool,
    pub verbose: bool,
    pub config: FileConfig,
}

impl Context {
    /// Open the working set at the configured database.
    pub fn library(&self) -> Result<Library, KenningError> {
        open_library(&self.database, self.backend, &self.config)
    }
}

/// Open a library over the chosen backend.
pub fn open_library(
    database: &Path,
    backend: Backend,
    config: &FileConfig,
) -> Result<Library, KenningError> {
    let store: Box<dyn KnowledgeRepository> = match backend {
        Backend::Redb => Box::new(RedbStore::open(database)?),
        Backend::File => Box::new(JsonFileStore::open(database)?),
    };
    Library::open(store, config.analysis.clone())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), KenningError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| KenningError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Split a comma-separated id list, dropping blanks.
fn parse_ids(list: &str) -> Vec<PointId> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PointId::new)
        .collect()
}

/// Parse a comma-separated relation type list; `None` means every type.
pub fn parse_types(list: Option<&str>) -> Result<BTreeSet<RelationType>, KenningError> {
    match list {
        None => Ok(RelationType::all()),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect(),
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    ctx: &Context,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let host = host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = port.unwrap_or(ctx.config.server.port);

    println!("Kenning Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", ctx.backend.as_str());
    println!("  Database: {:?}", ctx.database);
    println!("  Points:   {}", library.points().len());
    println!();
    println!("Endpoints:");
    println!("  GET  /points      - List knowledge points");
    println!("  POST /points      - Add knowledge points");
    println!("  POST /analyze     - Derive relations");
    println!("  POST /graph       - Graph view");
    println!("  GET  /key-points  - Key points by degree");
    println!("  GET  /gaps        - Gap findings");
    println!("  POST /path        - Learning path");
    println!("  POST /recommend   - Related points");
    println!("  GET  /status      - Working-set status");
    println!("  GET  /health      - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, library).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show working-set status.
pub fn cmd_status(ctx: &Context) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let metrics = library.metrics();

    if ctx.json_mode {
        let output = serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "backend": ctx.backend.as_str(),
            "point_count": metrics.point_count,
            "relation_count": metrics.relation_count,
            "category_count": metrics.category_count,
            "isolated_count": metrics.isolated_count,
            "density_millionths": metrics.density_millionths,
            "by_type": metrics.by_type,
        });
        print_json(&output)?;
        return Ok(());
    }

    println!("Kenning Working Set Status");
    println!("==========================");
    println!("Database: {:?}", ctx.database);
    println!("Backend:  {}", ctx.backend.as_str());
    println!();
    println!("Points:     {}", metrics.point_count);
    println!("Relations:  {}", metrics.relation_count);
    println!("Categories: {}", metrics.category_count);
    println!("Isolated:   {}", metrics.isolated_count);
    println!(
        "Density:    {} relations per million points",
        metrics.density_millionths
    );

    if ctx.verbose {
        println!();
        println!("Relations by type:");
        for (relation_type, count) in &metrics.by_type {
            println!("  {:<16} {}", relation_type.label(), count);
        }
    }

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), KenningError> {
    if ctx.database.exists() && !force {
        return Err(KenningError::InvalidArgument(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let mut library = ctx.library()?;
    library.clear()?;

    println!(
        "Initialized new {} database at {:?}",
        ctx.backend.as_str(),
        ctx.database
    );
    Ok(())
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Add knowledge points from a JSON array file.
pub fn cmd_ingest(ctx: &Context, file: &Path, merge: bool) -> Result<(), KenningError> {
    tracing::info!("Ingesting from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INGEST_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| KenningError::IoError(format!("Read file: {}", e)))?;
    let points: Vec<KnowledgePoint> = serde_json::from_slice(&contents)
        .map_err(|e| KenningError::DeserializationError(format!("Points file: {}", e)))?;

    if points.len() > MAX_IMPORT_POINTS {
        return Err(KenningError::InvalidArgument(format!(
            "Point count {} exceeds maximum {}",
            points.len(),
            MAX_IMPORT_POINTS
        )));
    }

    let mut library = ctx.library()?;
    let (added, skipped) = if merge {
        let summary = library.merge_points(points)?;
        (summary.points_added, summary.points_skipped)
    } else {
        (library.add_points(points)?, 0)
    };

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "added": added,
            "skipped": skipped,
            "total": library.points().len(),
        }))?;
        return Ok(());
    }

    println!("Ingested {} knowledge points ({} skipped)", added, skipped);
    println!("Working set now has {} points", library.points().len());
    Ok(())
}

// =============================================================================
// ANALYZE COMMAND
// =============================================================================

/// Re-derive relations from the current points.
pub fn cmd_analyze(ctx: &Context) -> Result<(), KenningError> {
    let mut library = ctx.library()?;
    let count = library.analyze()?;
    let metrics = library.metrics();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "relation_count": count,
            "by_type": metrics.by_type,
        }))?;
        return Ok(());
    }

    println!(
        "Derived {} relations from {} points",
        count, metrics.point_count
    );
    for (relation_type, n) in &metrics.by_type {
        println!("  {:<16} {}", relation_type.label(), n);
    }
    Ok(())
}

// =============================================================================
// RELATE COMMAND
// =============================================================================

/// Create a relation by hand.
pub fn cmd_relate(
    ctx: &Context,
    source: &str,
    target: &str,
    relation_type: &str,
    strength: f64,
    description: Option<String>,
) -> Result<(), KenningError> {
    let relation_type: RelationType = relation_type.parse()?;
    let mut library = ctx.library()?;
    let relation = library.create_relation(
        &PointId::new(source),
        &PointId::new(target),
        relation_type,
        strength,
        description,
    )?;

    if ctx.json_mode {
        print_json(&relation)?;
        return Ok(());
    }

    println!(
        "Created {} ({} -> {}, {}, strength {:.2})",
        relation.id,
        relation.source_id,
        relation.target_id,
        relation.relation_type.label(),
        relation.strength.value()
    );
    Ok(())
}

// =============================================================================
// GRAPH COMMAND
// =============================================================================

/// Print the graph view.
pub fn cmd_graph(ctx: &Context, types: Option<&str>) -> Result<(), KenningError> {
    let active = parse_types(types)?;
    let library = ctx.library()?;
    let graph = library.graph(&active);

    if ctx.json_mode {
        print_json(&graph)?;
        return Ok(());
    }

    println!(
        "Graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    println!();
    println!("Nodes:");
    for node in &graph.nodes {
        println!("  {:<20} [{}] {}", node.id, node.category, node.label);
    }
    println!();
    println!("Edges:");
    for edge in &graph.edges {
        println!(
            "  {} -> {} ({}, {:.2})",
            edge.source, edge.target, edge.label, edge.value
        );
    }
    Ok(())
}

// =============================================================================
// KEY POINTS COMMAND
// =============================================================================

/// Rank points by degree.
pub fn cmd_key_points(ctx: &Context, limit: usize) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let ranked = library.key_points(limit);
    let degrees: BTreeMap<PointId, usize> = degree_counts(library.relations()).into_iter().collect();

    let rows: Vec<serde_json::Value> = ranked
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "degree": degrees.get(id).copied().unwrap_or(0),
            })
        })
        .collect();

    if ctx.json_mode {
        print_json(&rows)?;
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No relations yet. Run `kenning analyze` first.");
        return Ok(());
    }
    println!("Key points:");
    for (rank, id) in ranked.iter().enumerate() {
        println!(
            "  {}. {} ({} relations)",
            rank + 1,
            id,
            degrees.get(id).copied().unwrap_or(0)
        );
    }
    Ok(())
}

// =============================================================================
// GAPS COMMAND
// =============================================================================

/// Report structural gaps.
pub fn cmd_gaps(ctx: &Context) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let findings = library.gaps();

    if ctx.json_mode {
        print_json(&findings)?;
        return Ok(());
    }

    if findings.is_empty() {
        println!("No gaps found");
        return Ok(());
    }
    for finding in &findings {
        println!("- {}", finding);
    }
    Ok(())
}

// =============================================================================
// PATH COMMAND
// =============================================================================

/// Generate a learning path.
pub fn cmd_path(ctx: &Context, targets: &str, strict: bool) -> Result<(), KenningError> {
    let targets = parse_ids(targets);
    if targets.is_empty() {
        return Err(KenningError::InvalidArgument(
            "At least one target id is required".to_string(),
        ));
    }

    let library = ctx.library()?;
    let path = library.learning_path(&targets, strict)?;

    if ctx.json_mode {
        print_json(&path)?;
        return Ok(());
    }

    println!("Learning path ({} steps):", path.len());
    for (step, point) in path.iter().enumerate() {
        println!(
            "  {}. {} [{}] {}",
            step + 1,
            point.id,
            point.category,
            kenning_core::graph::node_label(&point.content)
        );
    }
    Ok(())
}

// =============================================================================
// RECOMMEND COMMAND
// =============================================================================

/// Recommend related points.
pub fn cmd_recommend(ctx: &Context, point: &str, limit: usize) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let id = PointId::new(point);
    library.get_point(&id)?;
    let recommendations = library.recommend(&id, limit);

    if ctx.json_mode {
        print_json(&recommendations)?;
        return Ok(());
    }

    println!("Related to {}:", id);
    for rec in &recommendations {
        println!(
            "  {:.3}  {} [{}] {}",
            rec.score,
            rec.point.id,
            rec.point.category,
            kenning_core::graph::node_label(&rec.point.content)
        );
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the working set to a bundle file.
pub fn cmd_export(ctx: &Context, output: &Path, format: BundleFormat) -> Result<(), KenningError> {
    let validated_output = validate_output_path(output)?;

    let library = ctx.library()?;
    let bundle = library.export_bundle();

    let data = match format {
        BundleFormat::Binary => export_binary(&bundle)?,
        BundleFormat::Json => export_json(&bundle)?,
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| KenningError::IoError(format!("Write file: {}", e)))?;

    let hash = kenning_core::export::bundle_crypto_hash(&data);
    if ctx.json_mode {
        return print_json(&export_report(&bundle, &data, &validated_output, format, &hash));
    }

    println!(
        "Exported {} points and {} relations ({} bytes) to {:?}",
        bundle.points.len(),
        bundle.relations.len(),
        data.len(),
        validated_output
    );
    println!("BLAKE3: {}", hash);
    Ok(())
}

/// Machine-readable summary of a written export.
fn export_report(
    bundle: &ExportBundle,
    data: &[u8],
    output: &Path,
    format: BundleFormat,
    hash: &str,
) -> serde_json::Value {
    serde_json::json!({
        "output": output.display().to_string(),
        "format": format.as_str(),
        "points": bundle.points.len(),
        "relations": bundle.relations.len(),
        "bytes": data.len(),
        "hash": hash,
        "algorithm": "blake3",
    })
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Decode a bundle, choosing JSON when the content starts with `{`.
pub fn decode_bundle(data: &[u8]) -> Result<ExportBundle, KenningError> {
    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'{') {
        import_json(data)
    } else {
        import_binary(data)
    }
}

/// Import a bundle file.
pub fn cmd_import(ctx: &Context, input: &Path, merge: bool) -> Result<(), KenningError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| KenningError::IoError(format!("Read file: {}", e)))?;
    let bundle = decode_bundle(&data)?;

    let mode = if merge {
        ImportMode::Merge
    } else {
        ImportMode::Replace
    };
    let mut library = ctx.library()?;
    let summary = library.import_bundle(bundle, mode)?;

    if ctx.json_mode {
        print_json(&summary)?;
        return Ok(());
    }

    println!(
        "Imported {} points ({} skipped), {} relations ({} skipped)",
        summary.points_added,
        summary.points_skipped,
        summary.relations_added,
        summary.relations_skipped
    );
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the BLAKE3 content hash of the working set.
pub fn cmd_hash(ctx: &Context) -> Result<(), KenningError> {
    let library = ctx.library()?;
    let hash = library.content_hash()?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "hash": hash,
            "algorithm": "blake3",
            "points": library.points().len(),
            "relations": library.relations().len(),
        }))?;
    } else {
        println!("BLAKE3: {}", hash);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

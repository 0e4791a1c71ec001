//! # Kenning CLI Module
//!
//! This module implements the CLI interface for Kenning.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show working-set status
//! - `init` - Initialize a new database
//! - `ingest` - Add knowledge points from a JSON file
//! - `analyze` - Derive relations from the current points
//! - `relate` - Create a relation by hand
//! - `graph` - Print the graph view
//! - `key-points` - Rank points by degree
//! - `gaps` - Report structural gaps
//! - `path` - Generate a learning path
//! - `recommend` - Recommend related points
//! - `export` - Export the working set to a bundle file
//! - `import` - Import a bundle file
//! - `hash` - Compute the BLAKE3 hash of the exported bundle

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use kenning_core::KenningError;
use std::path::PathBuf;

pub use commands::*;
pub use config::{FileConfig, ServerConfig};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Kenning - knowledge relation analysis
///
/// Derives typed relations between knowledge points and answers structural
/// questions about them: key points, gaps, learning paths.
#[derive(Parser, Debug)]
#[command(name = "kenning")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database (a directory for the file backend)
    #[arg(short = 'D', long, global = true, default_value = "kenning.db")]
    pub database: PathBuf,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum, default_value_t = Backend::Redb)]
    pub backend: Backend,

    /// Path to a TOML configuration file with [analysis] and [server] tables
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Storage backend for the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A directory of pretty-printed JSON files
    File,
    /// A single redb database (ACID)
    Redb,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Redb => "redb",
        }
    }
}

/// Bundle file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BundleFormat {
    /// Framed postcard with header and checksum
    Binary,
    /// Pretty-printed JSON
    Json,
}

impl BundleFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BundleFormat::Binary => "binary",
            BundleFormat::Json => "json",
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show working-set status
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Add knowledge points from a JSON array file
    Ingest {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Skip points whose id already exists instead of failing
        #[arg(short, long)]
        merge: bool,
    },

    /// Re-derive all relations from the current points
    Analyze,

    /// Create a relation between two points
    Relate {
        /// Source point id
        #[arg(short, long)]
        source: String,

        /// Target point id
        #[arg(short, long)]
        target: String,

        /// Relation type (similar, prerequisite, extension, contradiction, parent_child)
        #[arg(short = 'r', long = "type")]
        relation_type: String,

        /// Strength, clamped to [0, 1]
        #[arg(long, default_value = "1.0")]
        strength: f64,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// Print the graph view
    Graph {
        /// Relation types to include (comma-separated, default all)
        #[arg(long)]
        types: Option<String>,
    },

    /// Rank points by number of relations
    KeyPoints {
        /// Maximum number of points
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Report sparse categories, under-connected categories and isolated points
    Gaps,

    /// Generate a learning path ending at the given targets
    Path {
        /// Target point ids (comma-separated)
        #[arg(short, long)]
        targets: String,

        /// Fail on cyclic dependencies instead of approximating
        #[arg(long)]
        strict: bool,
    },

    /// Recommend points related to a given point
    Recommend {
        /// Point id
        #[arg(short, long)]
        point: String,

        /// Maximum number of recommendations
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Export the working set
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format
        #[arg(short = 't', long, value_enum, default_value_t = BundleFormat::Binary)]
        format: BundleFormat,
    },

    /// Import a bundle (binary or JSON, detected from the content)
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Keep existing points and add only new ones
        #[arg(short, long)]
        merge: bool,
    },

    /// Compute BLAKE3 cryptographic hash of the binary export
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), KenningError> {
    let file_config = FileConfig::load(cli.config.as_deref())?;
    let ctx = Context {
        database: cli.database,
        backend: cli.backend,
        json_mode: cli.json_mode,
        verbose: cli.verbose,
        config: file_config,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&ctx, host, port).await,
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Ingest { file, merge }) => cmd_ingest(&ctx, &file, merge),
        Some(Commands::Analyze) => cmd_analyze(&ctx),
        Some(Commands::Relate {
            source,
            target,
            relation_type,
            strength,
            description,
        }) => cmd_relate(&ctx, &source, &target, &relation_type, strength, description),
        Some(Commands::Graph { types }) => cmd_graph(&ctx, types.as_deref()),
        Some(Commands::KeyPoints { limit }) => cmd_key_points(&ctx, limit),
        Some(Commands::Gaps) => cmd_gaps(&ctx),
        Some(Commands::Path { targets, strict }) => cmd_path(&ctx, &targets, strict),
        Some(Commands::Recommend { point, limit }) => cmd_recommend(&ctx, &point, limit),
        Some(Commands::Export { output, format }) => cmd_export(&ctx, &output, format),
        Some(Commands::Import { input, merge }) => cmd_import(&ctx, &input, merge),
        Some(Commands::Hash) => cmd_hash(&ctx),
    }
}

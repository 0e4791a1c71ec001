//! # Kenning - Knowledge Relation Server
//!
//! The main binary for the Kenning knowledge-relation analysis engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for working-set operations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              apps/kenning (THE BINARY)              │
//! │                                                     │
//! │      ┌─────────────┐          ┌─────────────┐       │
//! │      │    CLI      │          │  HTTP API   │       │
//! │      │   (clap)    │          │   (axum)    │       │
//! │      └──────┬──────┘          └──────┬──────┘       │
//! │             └───────────┬────────────┘              │
//! │                         ▼                           │
//! │                 ┌───────────────┐                   │
//! │                 │ kenning-core  │                   │
//! │                 │  (THE LOGIC)  │                   │
//! │                 └───────────────┘                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! kenning server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! kenning ingest -f points.json
//! kenning analyze
//! kenning path --targets kp-7,kp-9
//! ```

use clap::Parser;
use kenning::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // KENNING_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("KENNING_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kenning=info,kenning_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Kenning startup banner.
fn print_banner() {
    println!(
        r#"
  Kenning v{}
  Knowledge relations, gaps and learning paths
"#,
        env!("CARGO_PKG_VERSION")
    );
}

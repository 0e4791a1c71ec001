//! # Configuration File
//!
//! Optional TOML file passed with `--config`:
//!
//! ```toml
//! [analysis]
//! similarity_threshold = 0.6
//! duplicates = "keep_strongest"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 9000
//! ```
//!
//! Every key is optional. Security settings stay in environment variables
//! (`KENNING_API_KEY`, `KENNING_RATE_LIMIT`, `KENNING_CORS_ORIGINS`).

use kenning_core::{AnalysisConfig, KenningError};
use serde::Deserialize;
use std::path::Path;

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
}

/// `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl FileConfig {
    /// Load the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, KenningError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            KenningError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(KenningError::InvalidArgument(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| KenningError::IoError(format!("Read config: {}", e)))?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, KenningError> {
        toml::from_str(content)
            .map_err(|e| KenningError::DeserializationError(format!("Config: {}", e)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

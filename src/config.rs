//! Configuration module for sharefront.

use serde::Deserialize;
use std::path::{Component, Path};

use crate::{Result, SharefrontError};

/// Environment variable that overrides `storage.connection_string`.
pub const CONNECTION_STRING_ENV: &str = "SHAREFRONT_CONNECTION_STRING";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timezone for displaying file timestamps (e.g., "Europe/Berlin", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: default_timezone(),
        }
    }
}

/// Which gateway implementation backs the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// A file share mounted into the local filesystem.
    Filesystem,
    /// Process-local share, lost on exit.
    Memory,
}

/// Remote file share configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Gateway implementation.
    #[serde(default = "default_backend")]
    pub backend: StorageBackendKind,
    /// Connection string for the share. For the filesystem backend this is the mount point.
    #[serde(default = "default_connection_string")]
    pub connection_string: String,
    /// Share name.
    #[serde(default = "default_share")]
    pub share: String,
    /// Directory inside the share holding the files.
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_backend() -> StorageBackendKind {
    StorageBackendKind::Filesystem
}

fn default_connection_string() -> String {
    "data/shares".to_string()
}

fn default_share() -> String {
    "files".to_string()
}

fn default_directory() -> String {
    "uploads".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            connection_string: default_connection_string(),
            share: default_share(),
            directory: default_directory(),
        }
    }
}

/// Upload transfer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_size")]
    pub max_size_mb: u64,
    /// Size of each chunk written to the share.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,
    /// Maximum number of chunks in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_size() -> u64 {
    512
}

fn default_chunk_size() -> usize {
    3 * 1024 * 1024 // 3 MiB
}

fn default_max_concurrency() -> usize {
    10
}

impl UploadConfig {
    /// Maximum upload size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size(),
            chunk_size_bytes: default_chunk_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sharefront.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File share configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SharefrontError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SharefrontError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SHAREFRONT_CONNECTION_STRING`: Override the share connection string
    pub fn apply_env_overrides(&mut self) {
        if let Ok(connection_string) = std::env::var(CONNECTION_STRING_ENV) {
            if !connection_string.is_empty() {
                self.storage.connection_string = connection_string;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.share.trim().is_empty() {
            return Err(SharefrontError::Config(
                "storage.share must not be empty".to_string(),
            ));
        }
        if self.storage.backend == StorageBackendKind::Filesystem
            && self.storage.connection_string.trim().is_empty()
        {
            return Err(SharefrontError::Config(format!(
                "storage.connection_string is not set. \
                 Set it in config.toml or via {CONNECTION_STRING_ENV}."
            )));
        }
        let escapes = Path::new(&self.storage.directory)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(SharefrontError::Config(format!(
                "storage.directory must be relative and stay inside the share: {}",
                self.storage.directory
            )));
        }
        if self.upload.chunk_size_bytes == 0 {
            return Err(SharefrontError::Config(
                "upload.chunk_size_bytes must be greater than 0".to_string(),
            ));
        }
        if self.upload.max_concurrency == 0 {
            return Err(SharefrontError::Config(
                "upload.max_concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

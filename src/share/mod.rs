//! File share module for sharefront.
//!
//! This module provides everything between the web layer and the remote share:
//! - The [`StorageGateway`] trait and its filesystem/in-memory implementations
//! - Chunked uploads with bounded concurrency
//! - Listing with display metadata
//! - Download and upload with cleanup of partial files

pub mod chunked;
mod filesystem;
mod gateway;
mod listing;
mod memory;
mod metadata;
mod transfer;

use std::sync::Arc;

pub use filesystem::FsShare;
pub use gateway::{ByteStream, DirEntry, EntryKind, EntryProperties, FileHandle, StorageGateway};
pub use listing::ListingService;
pub use memory::MemoryShare;
pub use metadata::{format_bytes, FileInfo};
pub use transfer::{
    content_disposition, content_type_for, validate_file_name, Download, TransferService,
    TransferSettings, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENCY,
};

use crate::config::{StorageBackendKind, StorageConfig};

/// Build the gateway described by the storage configuration.
pub fn connect(config: &StorageConfig) -> Arc<dyn StorageGateway> {
    match config.backend {
        StorageBackendKind::Filesystem => {
            let share = FsShare::new(
                &config.connection_string,
                &config.share,
                &config.directory,
            );
            tracing::info!("Using file share at: {}", share.root().display());
            Arc::new(share)
        }
        StorageBackendKind::Memory => {
            tracing::warn!("Using in-memory file share; files are lost on exit");
            Arc::new(MemoryShare::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let config = StorageConfig {
            backend: StorageBackendKind::Memory,
            ..Default::default()
        };

        let gateway = connect(&config);
        assert!(gateway.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_filesystem() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackendKind::Filesystem,
            connection_string: temp_dir.path().to_str().unwrap().to_string(),
            share: "files".to_string(),
            directory: "uploads".to_string(),
        };

        let gateway = connect(&config);
        gateway.ensure_directory().await.unwrap();

        assert!(temp_dir.path().join("files").join("uploads").is_dir());
    }
}

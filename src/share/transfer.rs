//! Upload and download of files on the share.

use std::sync::Arc;

use super::gateway::{ByteStream, StorageGateway};
use crate::config::UploadConfig;
use crate::{Result, SharefrontError};

/// Default size of each uploaded chunk (3 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 3 * 1024 * 1024;

/// Default number of chunks in flight during an upload.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Tuning of chunked uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSettings {
    /// Size of each chunk written to the share.
    pub chunk_size: usize,
    /// Maximum number of chunks in flight.
    pub max_concurrency: usize,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl From<&UploadConfig> for TransferSettings {
    fn from(config: &UploadConfig) -> Self {
        Self {
            chunk_size: config.chunk_size_bytes,
            max_concurrency: config.max_concurrency,
        }
    }
}

/// A file ready to be streamed to a client.
pub struct Download {
    /// File name on the share.
    pub file_name: String,
    /// MIME type inferred from the file extension.
    pub content_type: String,
    /// `Content-Disposition` header value.
    pub content_disposition: String,
    /// Size in bytes at the time the download was opened.
    pub size: u64,
    /// File content.
    pub body: ByteStream,
}

/// Check that a name is a plain file name usable on the share.
///
/// Rejects empty names, path separators, `.`/`..` and control characters.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SharefrontError::Validation("file name is empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(SharefrontError::Validation(format!(
            "invalid file name: {name}"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(SharefrontError::Validation(format!(
            "file name must not contain path separators: {name}"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(SharefrontError::Validation(
            "file name must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Infer the MIME type from the file extension, `application/octet-stream` if unknown.
///
/// `text/*` types are declared as UTF-8.
pub fn content_type_for(name: &str) -> String {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    let is_text = mime.type_() == mime_guess::mime::TEXT;
    if is_text && mime.get_param(mime_guess::mime::CHARSET).is_none() {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

/// Build the `Content-Disposition` value for a download.
///
/// The name is percent-encoded (spaces as `%20`), so quotes, CR and LF cannot break
/// out of the header.
pub fn content_disposition(name: &str) -> String {
    format!("attachment; filename=\"{}\"", urlencoding::encode(name))
}

/// Moves file content between clients and the share.
pub struct TransferService {
    gateway: Arc<dyn StorageGateway>,
    settings: TransferSettings,
}

impl TransferService {
    /// Create a new TransferService.
    pub fn new(gateway: Arc<dyn StorageGateway>, settings: TransferSettings) -> Self {
        Self { gateway, settings }
    }

    /// Open a file for download.
    ///
    /// Fails before any content is produced if the file does not exist or the share
    /// cannot be reached.
    pub async fn download(&self, name: &str) -> Result<Download> {
        validate_file_name(name)?;

        let properties = self.gateway.get_properties(name).await?;
        let body = self.gateway.open_read(name).await?;

        tracing::info!(file = %name, size = properties.size, "Starting download");

        Ok(Download {
            file_name: name.to_string(),
            content_type: content_type_for(name),
            content_disposition: content_disposition(name),
            size: properties.size,
            body,
        })
    }

    /// Upload `body`, which must be exactly `size` bytes, under `name`.
    ///
    /// If creating or writing the file fails, the partially written file is deleted
    /// before the error is returned.
    pub async fn upload(&self, name: &str, body: ByteStream, size: u64) -> Result<()> {
        validate_file_name(name)?;

        if let Err(e) = self.gateway.ensure_directory().await {
            tracing::warn!(error = %e, "Failed to ensure share directory before upload");
        }

        let result = async {
            let handle = self.gateway.create_file(name, size).await?;
            self.gateway
                .write_chunked(
                    &handle,
                    body,
                    size,
                    self.settings.chunk_size,
                    self.settings.max_concurrency,
                )
                .await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(file = %name, size, "Upload completed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(file = %name, size, error = %e, "Upload failed");
                self.discard_partial(name).await;
                Err(e)
            }
        }
    }

    /// Best-effort removal of a partially written file.
    async fn discard_partial(&self, name: &str) {
        match self.gateway.exists(name).await {
            Ok(true) => match self.gateway.delete(name).await {
                Ok(_) => tracing::info!(file = %name, "Removed partially written file"),
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "Failed to remove partial file")
                }
            },
            Ok(false) => {}
            Err(e) => {
                tracing::error!(file = %name, error = %e, "Failed to check for partial file")
            }
        }
    }
}

//! Gateway trait for the remote file share.
//!
//! Everything the listing and transfer services need from the share goes through
//! [`StorageGateway`], so the backing store (a mounted share, an in-memory share, a
//! cloud SDK client) can be swapped without touching the services.

use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::Result;

/// A stream of byte chunks moving between the client, this process and the share.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A sub-directory.
    Directory,
}

/// An entry returned by directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name, unique within the directory.
    pub name: String,
    /// Whether the entry is a file or a sub-directory.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a sub-directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Check if this entry is a sub-directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Properties of a file on the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryProperties {
    /// Size in bytes.
    pub size: u64,
    /// When the file was created.
    pub created: DateTime<Utc>,
    /// When the file was last changed.
    pub changed: DateTime<Utc>,
}

/// Handle to a file created by [`StorageGateway::create_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// File name inside the share directory.
    pub name: String,
    /// Size the file was created with.
    pub size: u64,
}

/// Operations the services need from the file share.
///
/// All implementations must be thread-safe (`Send + Sync`) for use with tokio.
/// Names are plain file names inside the configured directory; callers validate them.
#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
    /// Create the target directory if it does not exist yet.
    ///
    /// An already existing directory is not an error.
    async fn ensure_directory(&self) -> Result<()>;

    /// List all entries of the target directory in backend order.
    async fn list_entries(&self) -> Result<Vec<DirEntry>>;

    /// Fetch size and timestamps of a file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no file with this name.
    async fn get_properties(&self, name: &str) -> Result<EntryProperties>;

    /// Open a stream over the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no file with this name.
    async fn open_read(&self, name: &str) -> Result<ByteStream>;

    /// Create (or truncate) a file of `size` bytes, zero-filled.
    async fn create_file(&self, name: &str, size: u64) -> Result<FileHandle>;

    /// Write `body` into a file created by [`create_file`](Self::create_file).
    ///
    /// The body is split into `chunk_size` pieces written at their offsets with at most
    /// `max_concurrency` pieces in flight.
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the body is not exactly `size` bytes long.
    async fn write_chunked(
        &self,
        handle: &FileHandle,
        body: ByteStream,
        size: u64,
        chunk_size: usize,
        max_concurrency: usize,
    ) -> Result<()>;

    /// Check whether a file with this name exists.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Delete a file.
    ///
    /// # Returns
    ///
    /// `true` if the file was deleted, `false` if it didn't exist
    async fn delete(&self, name: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry_constructors() {
        let file = DirEntry::file("a.txt");
        assert_eq!(file.name, "a.txt");
        assert!(!file.is_directory());

        let dir = DirEntry::directory("archive");
        assert_eq!(dir.kind, EntryKind::Directory);
        assert!(dir.is_directory());
    }
}

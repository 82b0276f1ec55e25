//! File share reachable through the local filesystem.
//!
//! Cloud file shares (Azure Files, NFS exports, SMB servers) are usually mounted into the
//! host. The share directory is laid out as:
//! ```text
//! {connection_string}/
//! └── {share}/
//!     └── {directory}/
//!         ├── report.pdf
//!         └── photo.jpg
//! ```

use std::ffi::OsString;
use std::fs::FileType;
use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use super::chunked::{self, Chunk};
use super::gateway::{
    ByteStream, DirEntry, EntryProperties, FileHandle, StorageGateway,
};
use crate::{Result, SharefrontError};

/// Filesystem implementation of [`StorageGateway`].
#[derive(Debug, Clone)]
pub struct FsShare {
    /// Directory holding the files.
    root: PathBuf,
}

impl FsShare {
    /// Create a gateway for `{connection_string}/{share}/{directory}`.
    ///
    /// Nothing is touched on disk until [`StorageGateway::ensure_directory`] runs.
    pub fn new(connection_string: &str, share: &str, directory: &str) -> Self {
        let root = Path::new(connection_string).join(share).join(directory);
        Self { root }
    }

    /// Get the directory holding the files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the full path of a file, refusing anything but a plain file name.
    fn file_path(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(SharefrontError::Validation(format!(
                "not a plain file name: {name:?}"
            ))),
        }
    }

    async fn write_at(path: &Path, chunk: Chunk) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| not_found_or_io(e, path))?;
        file.seek(SeekFrom::Start(chunk.offset)).await?;
        file.write_all(&chunk.data).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Map `NotFound` I/O errors to [`SharefrontError::NotFound`].
fn not_found_or_io(e: io::Error, path: &Path) -> SharefrontError {
    if e.kind() == io::ErrorKind::NotFound {
        SharefrontError::NotFound(format!("File: {}", path.display()))
    } else {
        SharefrontError::Io(e)
    }
}

/// Turn one `read_dir` result into a [`DirEntry`], or `None` (logged) if it is unusable.
///
/// An entry can vanish between `readdir` and `lstat`; that only drops the entry.
fn to_dir_entry(name: OsString, file_type: io::Result<FileType>) -> Option<DirEntry> {
    let name = match name.into_string() {
        Ok(name) => name,
        Err(raw) => {
            tracing::warn!(name = ?raw, "Skipping entry with non UTF-8 name");
            return None;
        }
    };

    match file_type {
        Ok(file_type) if file_type.is_dir() => Some(DirEntry::directory(name)),
        Ok(_) => Some(DirEntry::file(name)),
        Err(e) => {
            tracing::warn!(name = %name, error = %e, "Skipping entry with unreadable type");
            None
        }
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[async_trait]
impl StorageGateway for FsShare {
    async fn ensure_directory(&self) -> Result<()> {
        match fs::create_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_entries(&self) -> Result<Vec<DirEntry>> {
        let mut read_dir = fs::read_dir(&self.root).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let file_type = entry.file_type().await;
            if let Some(dir_entry) = to_dir_entry(entry.file_name(), file_type) {
                entries.push(dir_entry);
            }
        }

        Ok(entries)
    }

    async fn get_properties(&self, name: &str) -> Result<EntryProperties> {
        let path = self.file_path(name)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, &path))?;
        if !metadata.is_file() {
            return Err(SharefrontError::NotFound(format!("File: {name}")));
        }

        let changed = to_utc(metadata.modified()?);
        // Not every filesystem records a birth time.
        let created = metadata.created().map(to_utc).unwrap_or(changed);

        Ok(EntryProperties {
            size: metadata.len(),
            created,
            changed,
        })
    }

    async fn open_read(&self, name: &str) -> Result<ByteStream> {
        let path = self.file_path(name)?;
        let file = File::open(&path)
            .await
            .map_err(|e| not_found_or_io(e, &path))?;
        if !file.metadata().await?.is_file() {
            return Err(SharefrontError::NotFound(format!("File: {name}")));
        }
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn create_file(&self, name: &str, size: u64) -> Result<FileHandle> {
        let path = self.file_path(name)?;
        let file = File::create(&path).await?;
        file.set_len(size).await?;

        Ok(FileHandle {
            name: name.to_string(),
            size,
        })
    }

    async fn write_chunked(
        &self,
        handle: &FileHandle,
        body: ByteStream,
        size: u64,
        chunk_size: usize,
        max_concurrency: usize,
    ) -> Result<()> {
        let path = self.file_path(&handle.name)?;
        chunked::write_chunked(body, size, chunk_size, max_concurrency, |chunk| {
            Self::write_at(&path, chunk)
        })
        .await
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

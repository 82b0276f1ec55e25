//! In-memory file share.
//!
//! Keeps entries in insertion order, like a freshly enumerated share directory.
//! Used for development (`storage.backend = "memory"`) and tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::chunked::{self, Chunk};
use super::gateway::{
    ByteStream, DirEntry, EntryKind, EntryProperties, FileHandle, StorageGateway,
};
use crate::{Result, SharefrontError};

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    created: DateTime<Utc>,
    changed: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    File(MemoryFile),
    Directory,
}

/// In-memory implementation of [`StorageGateway`].
#[derive(Debug, Default)]
pub struct MemoryShare {
    entries: RwLock<Vec<(String, MemoryEntry)>>,
}

impl MemoryShare {
    /// Create an empty share.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a complete file, replacing any file of the same name.
    pub async fn insert_file(&self, name: &str, data: impl Into<Vec<u8>>) {
        let now = Utc::now();
        self.upsert(
            name,
            MemoryEntry::File(MemoryFile {
                data: data.into(),
                created: now,
                changed: now,
            }),
        )
        .await;
    }

    /// Store a file with explicit timestamps.
    pub async fn insert_file_with_times(
        &self,
        name: &str,
        data: impl Into<Vec<u8>>,
        created: DateTime<Utc>,
        changed: DateTime<Utc>,
    ) {
        self.upsert(
            name,
            MemoryEntry::File(MemoryFile {
                data: data.into(),
                created,
                changed,
            }),
        )
        .await;
    }

    /// Add a sub-directory entry.
    pub async fn add_directory(&self, name: &str) {
        self.upsert(name, MemoryEntry::Directory).await;
    }

    /// Get a copy of a file's content.
    pub async fn read_file(&self, name: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.iter().find_map(|(n, e)| match e {
            MemoryEntry::File(f) if n == name => Some(f.data.clone()),
            _ => None,
        })
    }

    async fn upsert(&self, name: &str, entry: MemoryEntry) {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = entry,
            None => entries.push((name.to_string(), entry)),
        }
    }

    async fn write_at(&self, name: &str, chunk: Chunk) -> Result<()> {
        let mut entries = self.entries.write().await;
        let file = entries
            .iter_mut()
            .find_map(|(n, e)| match e {
                MemoryEntry::File(f) if n == name => Some(f),
                _ => None,
            })
            .ok_or_else(|| SharefrontError::NotFound(format!("File: {name}")))?;

        let start = usize::try_from(chunk.offset)
            .map_err(|_| SharefrontError::Backend("offset out of range".to_string()))?;
        let end = start + chunk.data.len();
        if end > file.data.len() {
            return Err(SharefrontError::Backend(format!(
                "write past end of file: {end} > {}",
                file.data.len()
            )));
        }
        file.data[start..end].copy_from_slice(&chunk.data);
        file.changed = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for MemoryShare {
    async fn ensure_directory(&self) -> Result<()> {
        Ok(())
    }

    async fn list_entries(&self) -> Result<Vec<DirEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|(name, entry)| DirEntry {
                name: name.clone(),
                kind: match entry {
                    MemoryEntry::File(_) => EntryKind::File,
                    MemoryEntry::Directory => EntryKind::Directory,
                },
            })
            .collect())
    }

    async fn get_properties(&self, name: &str) -> Result<EntryProperties> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find_map(|(n, e)| match e {
                MemoryEntry::File(f) if n == name => Some(EntryProperties {
                    size: f.data.len() as u64,
                    created: f.created,
                    changed: f.changed,
                }),
                _ => None,
            })
            .ok_or_else(|| SharefrontError::NotFound(format!("File: {name}")))
    }

    async fn open_read(&self, name: &str) -> Result<ByteStream> {
        let data = self
            .read_file(name)
            .await
            .ok_or_else(|| SharefrontError::NotFound(format!("File: {name}")))?;
        let item: std::io::Result<Bytes> = Ok(Bytes::from(data));
        Ok(Box::pin(futures::stream::iter(vec![item])))
    }

    async fn create_file(&self, name: &str, size: u64) -> Result<FileHandle> {
        let len = usize::try_from(size)
            .map_err(|_| SharefrontError::Validation(format!("file too large: {size} bytes")))?;

        {
            let entries = self.entries.read().await;
            if entries
                .iter()
                .any(|(n, e)| n == name && matches!(e, MemoryEntry::Directory))
            {
                return Err(SharefrontError::Backend(format!(
                    "{name} is a directory"
                )));
            }
        }

        let now = Utc::now();
        self.upsert(
            name,
            MemoryEntry::File(MemoryFile {
                data: vec![0; len],
                created: now,
                changed: now,
            }),
        )
        .await;

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
        chunked::write_chunked(body, size, chunk_size, max_concurrency, |chunk| {
            self.write_at(&handle.name, chunk)
        })
        .await
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .any(|(n, e)| n == name && matches!(e, MemoryEntry::File(_))))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(n, e)| !(n == name && matches!(e, MemoryEntry::File(_))));
        Ok(entries.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn body(data: &'static [u8]) -> ByteStream {
        let item: std::io::Result<Bytes> = Ok(Bytes::from_static(data));
        Box::pin(futures::stream::iter(vec![item]))
    }

    async fn read_all(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(piece) = stream.next().await {
            out.extend_from_slice(&piece.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let share = MemoryShare::new();
        share.insert_file("b.txt", "b").await;
        share.add_directory("sub").await;
        share.insert_file("a.txt", "a").await;

        let entries = share.list_entries().await.unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry::file("b.txt"),
                DirEntry::directory("sub"),
                DirEntry::file("a.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_and_write_chunked() {
        let share = MemoryShare::new();
        let handle = share.create_file("data.bin", 10).await.unwrap();
        assert_eq!(share.read_file("data.bin").await.unwrap(), vec![0; 10]);

        share
            .write_chunked(&handle, body(b"0123456789"), 10, 3, 2)
            .await
            .unwrap();

        assert_eq!(share.read_file("data.bin").await.unwrap(), b"0123456789");
        assert_eq!(share.get_properties("data.bin").await.unwrap().size, 10);
    }

    #[tokio::test]
    async fn test_open_read() {
        let share = MemoryShare::new();
        share.insert_file("hello.txt", "Hello, World!").await;

        let stream = share.open_read("hello.txt").await.unwrap();
        assert_eq!(read_all(stream).await, b"Hello, World!");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let share = MemoryShare::new();

        assert!(matches!(
            share.get_properties("missing").await,
            Err(SharefrontError::NotFound(_))
        ));
        assert!(matches!(
            share.open_read("missing").await,
            Err(SharefrontError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let share = MemoryShare::new();
        share.add_directory("sub").await;

        assert!(!share.exists("sub").await.unwrap());
        assert!(share.get_properties("sub").await.is_err());
        assert!(share.create_file("sub", 1).await.is_err());
        assert!(!share.delete("sub").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let share = MemoryShare::new();
        share.insert_file("gone.txt", "x").await;

        assert!(share.delete("gone.txt").await.unwrap());
        assert!(!share.exists("gone.txt").await.unwrap());
        assert!(!share.delete("gone.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_replaces_in_place() {
        let share = MemoryShare::new();
        share.insert_file("a", "1").await;
        share.insert_file("b", "2").await;
        share.insert_file("a", "3").await;

        let names: Vec<_> = share
            .list_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(share.read_file("a").await.unwrap(), b"3");
    }
}

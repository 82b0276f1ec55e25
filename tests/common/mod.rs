//! Test helpers for integration tests.
//!
//! Provides a fault-injecting share and a ready-made HTTP test server.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;

use sharefront::share::{
    ByteStream, DirEntry, EntryProperties, FileHandle, MemoryShare, StorageGateway,
    TransferSettings,
};
use sharefront::web::{create_health_router, create_router, AppState};
use sharefront::{Result, SharefrontError};

/// Maximum upload size used by test servers.
pub const TEST_MAX_UPLOAD: u64 = 64 * 1024;

/// Small chunks so that even short test files are written in several pieces.
pub fn test_settings() -> TransferSettings {
    TransferSettings {
        chunk_size: 8,
        max_concurrency: 3,
    }
}

/// A [`MemoryShare`] wrapper that fails selected operations on demand.
#[derive(Default)]
pub struct FaultyShare {
    inner: MemoryShare,
    unreachable: AtomicBool,
    fail_writes: AtomicBool,
    failing_properties: Mutex<HashSet<String>>,
    deletes: AtomicUsize,
}

impl FaultyShare {
    /// Create an empty, healthy share.
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped share, for seeding and inspecting content.
    pub fn inner(&self) -> &MemoryShare {
        &self.inner
    }

    /// Make every operation fail as if the share could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make chunked writes fail after the file was created.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make property lookups fail for one file name.
    pub fn fail_properties_for(&self, name: &str) {
        self.failing_properties
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Number of delete calls that reached the share.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(SharefrontError::Backend("share unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for FaultyShare {
    async fn ensure_directory(&self) -> Result<()> {
        self.check_reachable()?;
        self.inner.ensure_directory().await
    }

    async fn list_entries(&self) -> Result<Vec<DirEntry>> {
        self.check_reachable()?;
        self.inner.list_entries().await
    }

    async fn get_properties(&self, name: &str) -> Result<EntryProperties> {
        self.check_reachable()?;
        if self.failing_properties.lock().unwrap().contains(name) {
            return Err(SharefrontError::Backend(format!(
                "properties unavailable for {name}"
            )));
        }
        self.inner.get_properties(name).await
    }

    async fn open_read(&self, name: &str) -> Result<ByteStream> {
        self.check_reachable()?;
        self.inner.open_read(name).await
    }

    async fn create_file(&self, name: &str, size: u64) -> Result<FileHandle> {
        self.check_reachable()?;
        self.inner.create_file(name, size).await
    }

    async fn write_chunked(
        &self,
        handle: &FileHandle,
        body: ByteStream,
        size: u64,
        chunk_size: usize,
        max_concurrency: usize,
    ) -> Result<()> {
        self.check_reachable()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SharefrontError::Backend("write rejected".to_string()));
        }
        self.inner
            .write_chunked(handle, body, size, chunk_size, max_concurrency)
            .await
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        self.check_reachable()?;
        self.inner.exists(name).await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        self.check_reachable()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(name).await
    }
}

/// Create an HTTP test server on top of the given gateway.
pub fn create_test_server(gateway: Arc<dyn StorageGateway>) -> TestServer {
    let app_state = Arc::new(AppState::new(
        gateway,
        chrono_tz::UTC,
        test_settings(),
        TEST_MAX_UPLOAD,
    ));

    let router = create_router(app_state).merge(create_health_router());

    TestServer::new(router).expect("Failed to create test server")
}

//! File listing service.

use std::sync::Arc;

use chrono_tz::Tz;

use super::gateway::StorageGateway;
use super::metadata::FileInfo;

/// Builds the file listing for the share directory.
pub struct ListingService {
    gateway: Arc<dyn StorageGateway>,
    timezone: Tz,
}

impl ListingService {
    /// Create a new ListingService.
    pub fn new(gateway: Arc<dyn StorageGateway>, timezone: Tz) -> Self {
        Self { gateway, timezone }
    }

    /// List the files of the share directory in enumeration order.
    ///
    /// Sub-directories are skipped. Files whose properties cannot be read are left out
    /// and logged; an unreachable share yields an empty listing.
    pub async fn list_files(&self) -> Vec<FileInfo> {
        if let Err(e) = self.gateway.ensure_directory().await {
            tracing::warn!(error = %e, "Failed to ensure share directory, listing anyway");
        }

        let entries = match self.gateway.list_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Failed to enumerate share directory");
                return Vec::new();
            }
        };

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_directory() {
                continue;
            }

            match self.gateway.get_properties(&entry.name).await {
                Ok(properties) => {
                    files.push(FileInfo::project(entry.name, &properties, self.timezone));
                }
                Err(e) => {
                    tracing::warn!(file = %entry.name, error = %e, "Skipping file in listing");
                }
            }
        }

        tracing::debug!(count = files.len(), "Listed share directory");
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::MemoryShare;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_list_files_empty() {
        let service = ListingService::new(Arc::new(MemoryShare::new()), Tz::UTC);

        assert!(service.list_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_files_projects_properties() {
        let share = Arc::new(MemoryShare::new());
        let created = Utc.with_ymd_and_hms(2023, 11, 5, 9, 0, 0).unwrap();
        let changed = Utc.with_ymd_and_hms(2024, 2, 29, 17, 45, 12).unwrap();
        share
            .insert_file_with_times("notes.txt", vec![b'x'; 2048], created, changed)
            .await;

        let service = ListingService::new(share, Tz::UTC);
        let files = service.list_files().await;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "notes.txt");
        assert_eq!(files[0].size, "2.00 KiB");
        assert_eq!(files[0].creation_date, "2023/11/05");
        assert_eq!(files[0].creation_time, "09:00:00.000");
        assert_eq!(files[0].edit_date, "2024/02/29");
        assert_eq!(files[0].edit_time, "17:45:12.000");
    }

    #[tokio::test]
    async fn test_list_files_skips_directories_and_keeps_order() {
        let share = Arc::new(MemoryShare::new());
        share.insert_file("zeta.txt", "z").await;
        share.add_directory("archive").await;
        share.insert_file("alpha.txt", "a").await;
        share.add_directory("backup").await;
        share.insert_file("mid.txt", "m").await;

        let service = ListingService::new(share, Tz::UTC);
        let names: Vec<_> = service
            .list_files()
            .await
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(names, vec!["zeta.txt", "alpha.txt", "mid.txt"]);
    }
}

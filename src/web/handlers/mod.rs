//! HTTP handlers for the file share front-end.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::config::Config;
use crate::datetime::parse_timezone;
use crate::share::{self, ListingService, StorageGateway, TransferService, TransferSettings};

/// Shared state handed to every handler.
pub struct AppState {
    /// Listing of the configured share directory.
    pub listing: ListingService,
    /// Downloads and uploads.
    pub transfer: TransferService,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state around an existing gateway.
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        timezone: chrono_tz::Tz,
        settings: TransferSettings,
        max_upload_size: u64,
    ) -> Self {
        Self {
            listing: ListingService::new(gateway.clone(), timezone),
            transfer: TransferService::new(gateway, settings),
            max_upload_size,
        }
    }

    /// Build the state from configuration, connecting to the configured share.
    pub fn from_config(config: &Config) -> Self {
        let gateway = share::connect(&config.storage);
        Self::new(
            gateway,
            parse_timezone(&config.server.timezone),
            TransferSettings::from(&config.upload),
            config.upload.max_size_bytes(),
        )
    }
}

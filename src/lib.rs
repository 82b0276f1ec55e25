//! sharefront - a minimal web front-end for a remote file share.
//!
//! Lists the files of one share directory, streams downloads as attachments and
//! uploads files in fixed-size chunks, all over plain HTTP.

pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod share;
pub mod web;

pub use config::Config;
pub use error::{Result, SharefrontError};
pub use share::{
    format_bytes, FileInfo, ListingService, MemoryShare, StorageGateway, TransferService,
};
pub use web::{AppState, WebServer};

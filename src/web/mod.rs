//! Web module for sharefront.
//!
//! Serves the listing page, downloads and multipart uploads over HTTP,
//! plus a JSON listing and a health check.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod view;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;

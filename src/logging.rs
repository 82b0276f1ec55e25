//! Tracing setup for sharefront.
//!
//! Events go to stdout and, unless `logging.file` is empty, are mirrored into a log
//! file. `RUST_LOG` directives are layered on top of `logging.level`, so
//! `RUST_LOG=tower_http=debug` shows request traces without raising the global level.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a tracing level. Unknown names mean `info`.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Open (truncating) the log file, creating its directory first.
///
/// Returns `None` for an empty path.
fn open_log_file(path: &str) -> Result<Option<Arc<File>>> {
    if path.is_empty() {
        return Ok(None);
    }

    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    Ok(Some(Arc::new(File::create(path)?)))
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if the log file or its directory cannot be created; callers fall back to
/// [`init_console_only`].
pub fn init(config: &LoggingConfig) -> Result<()> {
    let Some(log_file) = open_log_file(&config.file)? else {
        init_console_only(&config.level);
        return Ok(());
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(&config.level))
        .init();

    Ok(())
}

/// Install a stdout-only subscriber with colored output.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(build_filter(level))
        .init();
}

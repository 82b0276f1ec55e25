use std::sync::Arc;

use tracing::info;

use sharefront::{AppState, Config, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = sharefront::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        sharefront::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("sharefront - file share front-end");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let app_state = Arc::new(AppState::from_config(&config));

    let server = match WebServer::new(&config.server, app_state) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

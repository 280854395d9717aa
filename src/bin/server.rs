//! Sigmatch Server
//!
//! HTTP API plus the scanner. Scanning starts right away when `TICKERS` is
//! set; otherwise it waits for a `start_scanner` command.

use dotenvy::dotenv;
use sigmatch::config::AppConfig;
use sigmatch::core::bootstrap::build_scanner;
use sigmatch::core::http::{start_server, AppState};
use sigmatch::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;
    info!("Starting Sigmatch Server");
    info!(environment = %config.environment, "Environment");
    info!("HTTP Server: http://0.0.0.0:{}", config.port);

    let app = build_scanner(&config)?;

    if config.runtime.tickers.is_empty() {
        info!("No TICKERS configured - send start_scanner to POST /api/commands to begin");
    } else {
        app.scanner.start(Vec::new()).await?;
    }

    let state = AppState::new(app.scanner.clone(), app.recent.clone(), app.metrics.clone());
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }
    app.scanner.stop().await;

    Ok(())
}

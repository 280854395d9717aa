//! Sigmatch Worker
//!
//! Runs the scanner over the configured watchlist without an HTTP surface.

use dotenvy::dotenv;
use sigmatch::config::AppConfig;
use sigmatch::core::bootstrap::build_scanner;
use sigmatch::logging;
use sigmatch::models::messages::ScannerEvent;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;
    info!("Starting Sigmatch Worker");
    info!(environment = %config.environment, "Environment");

    if config.runtime.tickers.is_empty() {
        return Err("TICKERS must name at least one ticker for the worker".into());
    }

    let app = build_scanner(&config)?;
    let mut events = app.scanner.subscribe();

    let tickers = app.scanner.start(Vec::new()).await?;
    info!(
        interval = config.runtime.scan_interval_seconds,
        "Scanning {} every {} seconds",
        tickers.join(", "),
        config.runtime.scan_interval_seconds
    );

    info!("Worker started, waiting for shutdown signal...");
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutting down worker...");
                app.scanner.stop().await;
                info!("Worker stopped");
                break;
            }
            event = events.recv() => match event {
                Ok(ScannerEvent::Error { message }) => warn!(message = %message, "Scanner error"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped = skipped, "Event listener lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

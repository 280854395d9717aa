//! HTTP endpoint server using Axum

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::core::runtime::Scanner;
use crate::metrics::Metrics;
use crate::models::atom::AtomSummary;
use crate::models::messages::{ScannerCommand, ScannerEvent};
use crate::models::molecule::Molecule;
use crate::models::signal::Signal;
use crate::signals::sink::RecentSignals;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub recent: Arc<RecentSignals>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(scanner: Arc<Scanner>, recent: Arc<RecentSignals>, metrics: Arc<Metrics>) -> Self {
        Self {
            scanner,
            recent,
            metrics,
            start_time: Arc::new(Instant::now()),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "scanner_running": state.scanner.is_running().await,
        "tickers": state.scanner.tickers().await,
        "service": "sigmatch"
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.metrics.export().map_err(|e| {
        error!(error = %e, "Failed to export metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn list_atoms(State(state): State<AppState>) -> Json<Vec<AtomSummary>> {
    let registries = state.scanner.registries().await;
    Json(registries.atoms.all().iter().map(AtomSummary::from).collect())
}

async fn list_molecules(State(state): State<AppState>) -> Json<Vec<Molecule>> {
    let registries = state.scanner.registries().await;
    Json(registries.molecules.all().to_vec())
}

#[derive(Debug, Deserialize)]
struct SignalQuery {
    ticker: Option<String>,
}

/// Recent signals, newest first
async fn list_signals(
    State(state): State<AppState>,
    Query(params): Query<SignalQuery>,
) -> Json<Vec<Signal>> {
    let ticker = params.ticker.map(|t| t.trim().to_uppercase());
    Json(state.recent.recent(ticker.as_deref()).await)
}

async fn handle_command(
    State(state): State<AppState>,
    Json(command): Json<ScannerCommand>,
) -> (StatusCode, Json<ScannerEvent>) {
    info!(command = ?command, "Received scanner command");
    let event = state.scanner.handle_command(command).await;
    let status = match event {
        ScannerEvent::Error { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    (status, Json(event))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/atoms", get(list_atoms))
        .route("/api/molecules", get(list_molecules))
        .route("/api/signals", get(list_signals))
        .route("/api/commands", post(handle_command))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

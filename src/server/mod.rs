//! HTTP server exposing the idea pipeline
//!
//! This module provides the axum server: REST routes for projects, stages,
//! validation, refinement and prompt templates, all behind a uniform
//! `{"result": …}` / `{"error": …}` envelope.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    version: String,
}

/// Build the full router with CORS applied
pub fn build_router(state: AppState, cors_origins: Option<Vec<String>>) -> Router {
    // Build CORS layer
    // Note: Using explicit headers instead of Any to avoid browser deprecation warnings
    // when Authorization header is used with wildcard
    let cors = match &cors_origins {
        Some(origins) if !origins.is_empty() => {
            // Restricted CORS: only allow specified origins
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
        _ => {
            // Permissive CORS: allow any origin (default for development)
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
    };

    Router::new()
        .merge(routes::api_router())
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(
    port: u16,
    bind: &str,
    state: AppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let shutdown_state = state.shutdown_state.clone();
    let app = build_router(state, cors_origins.clone());

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = match &cors_origins {
        Some(origins) if !origins.is_empty() => origins.join(", "),
        _ => "*".to_string(),
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                       IdeaForge Server                        ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                               ║");
    println!("║  Server URL: http://{}:{:<24}  ║", bind, port);
    println!("║                                                               ║");
    println!("║  CORS Origins: {:<45}║", cors_display);
    println!("║                                                               ║");
    println!("║  Endpoints:                                                   ║");
    println!("║    POST /api/projects               - Create a project       ║");
    println!("║    POST /api/projects/:id/validate  - Score an idea          ║");
    println!("║    POST /api/projects/:id/refine    - Refine the overview    ║");
    println!("║    GET  /api/templates              - Prompt templates       ║");
    println!("║    GET  /api/version                - Server version info    ║");
    println!("║    GET  /health                     - Health check           ║");
    println!("║                                                               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    // Create shutdown signal that waits for the shutdown state flag
    let shutdown_signal = async move {
        loop {
            if shutdown_state.is_shutdown_requested() {
                log::info!("Shutdown signal received, stopping server...");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

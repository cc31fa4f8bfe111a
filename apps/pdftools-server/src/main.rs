//! pdftools API Server
//!
//! A stateless REST API for PDF page editing. Provides endpoints for:
//!
//! - Upload inspection (page count, version, metadata)
//! - Page removal, reordering, and extraction
//! - Merge with positional insertions
//! - Per-page splitting with ZIP packaging
//! - Page preview rasterization
//!
//! Documents travel as base64 in JSON request/response bodies; the server
//! holds no session state between requests.

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use pdftools_core::UploadLimits;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{
    handle_consolidate, handle_extract, handle_health, handle_insert, handle_inspect,
    handle_merge, handle_preview, handle_remove_pages, handle_reorder, handle_split,
};

/// Command-line arguments for the pdftools server
#[derive(Parser, Debug)]
#[command(name = "pdftools-server")]
#[command(about = "pdftools API server for PDF page editing")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Maximum number of files per request
    #[arg(long, default_value = "10")]
    max_files: usize,

    /// Maximum size of a single uploaded file in MiB
    #[arg(long, default_value = "50")]
    max_file_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upload constraints applied to every request
    pub limits: UploadLimits,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pdftools server on {}:{}", args.host, args.port);

    let limits = UploadLimits {
        max_files: args.max_files,
        max_file_bytes: args.max_file_mb * 1024 * 1024,
    };

    let state = AppState { limits };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Base64 inflates payloads by 4/3; size the body limit for a full batch.
    let body_limit = limits.max_files * limits.max_file_bytes * 4 / 3 + 1024 * 1024;

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/inspect", post(handle_inspect))
        .route("/api/merge", post(handle_merge))
        .route("/api/insert", post(handle_insert))
        .route("/api/consolidate", post(handle_consolidate))
        .route("/api/remove-pages", post(handle_remove_pages))
        .route("/api/extract", post(handle_extract))
        .route("/api/reorder", post(handle_reorder))
        .route("/api/split", post(handle_split))
        .route("/api/preview", post(handle_preview))
        // Apply middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Upload limits: {} files, {} MiB each",
        args.max_files, args.max_file_mb
    );

    axum::serve(listener, app).await?;

    Ok(())
}

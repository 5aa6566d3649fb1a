//! Development-only HTTP server for the category tree
//!
//! Exposes `CategoryTreeManager` as a REST API so the tree can be driven from
//! curl or a frontend in development. It should NEVER be exposed beyond
//! localhost.
//!
//! # Architecture
//!
//! - `category_endpoints`: tree reads and mutations, plus health check
//! - `http_error`: maps `CategoryTreeError` onto status codes
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dev-server
//! FOLIO_DB_PATH=memory DEV_SERVER_PORT=3002 cargo run --bin dev-server
//! ```
//!
//! # Security
//!
//! - CORS restricted to local frontend origins
//! - No authentication (local development only)

use axum::{
    http::{header, Method},
    Router,
};
use folio_core::services::{CategoryTreeManager, InMemoryContentIndex};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod category_endpoints;
mod http_error;

pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// The manager serializes structural edits itself, so handlers need no
/// request-level write lock.
#[derive(Clone)]
pub struct AppState {
    pub manager: CategoryTreeManager,

    /// Content counts reported by tree views and checked by deletes
    pub content: Arc<InMemoryContentIndex>,
}

impl AppState {
    /// Wire `content` into the manager's delete policies and keep it for counts
    pub fn new(manager: CategoryTreeManager, content: Arc<InMemoryContentIndex>) -> Self {
        Self {
            manager: manager.with_content_lookup(content.clone()),
            content,
        }
    }
}

/// Create the main application router with all endpoint modules
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(category_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Create CORS layer for development
///
/// Default origins cover common Vite ports. Override with
/// `CORS_ALLOW_ORIGIN="http://localhost:8080"`.
fn cors_layer() -> CorsLayer {
    let default_origins = ["http://localhost:1420", "http://localhost:5173"];

    let custom = std::env::var("CORS_ALLOW_ORIGIN").ok().and_then(|origin| {
        match origin.parse::<header::HeaderValue>() {
            Ok(value) => Some(vec![value]),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS_ALLOW_ORIGIN '{}'", origin);
                None
            }
        }
    });

    let origins = custom.unwrap_or_else(|| {
        default_origins
            .into_iter()
            .map(header::HeaderValue::from_static)
            .collect()
    });

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Start the HTTP dev server
///
/// # Errors
///
/// Returns error if server fails to bind or start.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("HTTP dev server starting on http://{}", addr);
    tracing::info!("Development mode only - NOT for production use");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Development HTTP Server Binary
//!
//! Starts the category tree REST API for local development.
//!
//! # Usage
//!
//! ```bash
//! # Default settings (port 3001, ~/.folio/database/folio-dev.db)
//! cargo run --bin dev-server
//!
//! # In-memory store on another port
//! FOLIO_DB_PATH=memory DEV_SERVER_PORT=3002 cargo run --bin dev-server
//! ```
//!
//! # Environment Variables
//!
//! - `DEV_SERVER_PORT`, `FOLIO_DB_PATH`, `FOLIO_MAX_TREE_DEPTH`: see
//!   `folio_dev_tools::config`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! # Security
//!
//! **DEVELOPMENT ONLY**: no authentication, binds to 127.0.0.1.

use std::sync::Arc;

use folio_core::db::{CategoryStore, InMemoryCategoryStore, LibsqlCategoryStore};
use folio_core::services::{CategoryTreeManager, InMemoryContentIndex};
use folio_dev_tools::dev_server::{start_server, AppState};
use folio_dev_tools::{DevServerConfig, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Folio HTTP Dev Server");

    let config = DevServerConfig::from_env()?;
    tracing::info!("Port: {}", config.port);

    let store: Arc<dyn CategoryStore> = match &config.storage {
        StorageBackend::InMemory => {
            tracing::info!("Database: in-memory (lost on exit)");
            Arc::new(InMemoryCategoryStore::new())
        }
        StorageBackend::Libsql(db_path) => {
            tracing::info!("Database: {}", db_path.display());
            Arc::new(LibsqlCategoryStore::new(db_path.clone()).await?)
        }
    };

    let manager = CategoryTreeManager::new(store, config.tree.clone())?;
    let state = AppState::new(manager, Arc::new(InMemoryContentIndex::new()));

    tracing::info!("Services initialized");

    start_server(state, config.port).await?;

    Ok(())
}

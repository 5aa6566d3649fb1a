//! Dev server configuration
//!
//! # Environment Variables
//!
//! - `DEV_SERVER_PORT`: Server port (default: 3001)
//! - `FOLIO_DB_PATH`: libsql database file, or `memory` for an in-memory
//!   store (default: `~/.folio/database/folio-dev.db`)
//! - `FOLIO_MAX_TREE_DEPTH`: depth cap for tree views (default: 64)

use anyhow::{anyhow, Context, Result};
use folio_core::CategoryTreeConfig;
use std::path::PathBuf;

/// Default port, same as the desktop dev server it replaces
pub const DEFAULT_PORT: u16 = 3001;

/// Where the dev server keeps categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Lost on restart
    InMemory,
    /// libsql database file
    Libsql(PathBuf),
}

#[derive(Debug, Clone)]
pub struct DevServerConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub tree: CategoryTreeConfig,
}

impl DevServerConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("DEV_SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("DEV_SERVER_PORT '{}' is not a valid port", raw))?,
            None => DEFAULT_PORT,
        };

        let storage = match lookup("FOLIO_DB_PATH") {
            Some(raw) if raw.eq_ignore_ascii_case("memory") => StorageBackend::InMemory,
            Some(raw) => StorageBackend::Libsql(PathBuf::from(raw)),
            None => StorageBackend::Libsql(default_db_path()?),
        };

        let mut tree = CategoryTreeConfig::default();
        if let Some(raw) = lookup("FOLIO_MAX_TREE_DEPTH") {
            tree.max_tree_depth = raw
                .parse::<u32>()
                .with_context(|| format!("FOLIO_MAX_TREE_DEPTH '{}' is not a number", raw))?;
        }
        tree.validate().map_err(|e| anyhow!(e))?;

        Ok(Self {
            port,
            storage,
            tree,
        })
    }
}

/// `~/.folio/database/folio-dev.db`
pub fn default_db_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;
    Ok(home_dir
        .join(".folio")
        .join("database")
        .join("folio-dev.db"))
}

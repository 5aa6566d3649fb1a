//! Folio Core - Category Tree Layer
//!
//! This crate maintains the category hierarchy of the Folio CMS backend:
//! creating, renaming, re-parenting, and deleting categories while keeping a
//! materialized path on every record consistent.
//!
//! # Architecture
//!
//! - **Materialized paths**: every category stores the id chain from its root
//!   (`"<root>/<child>/<self>"`), so ancestor and descendant queries are prefix
//!   operations instead of recursive walks
//! - **Pluggable storage**: the tree logic only talks to the `CategoryStore`
//!   trait; an in-memory map and a libsql table are provided
//! - **Structural lock**: one tree-wide `RwLock` per manager serializes moves
//!   and deletes so no reader sees a half-rewritten subtree
//!
//! # Modules
//!
//! - [`models`] - Category records, updates, delete policies, tree views
//! - [`tree`] - Path encoding and cycle detection
//! - [`db`] - `CategoryStore` trait and its backends
//! - [`services`] - `CategoryTreeManager`, content lookup seam, domain events
//! - [`config`] - Manager configuration

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use config::CategoryTreeConfig;
pub use models::*;
pub use services::*;

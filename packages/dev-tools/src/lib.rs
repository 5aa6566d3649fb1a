//! Folio Development Tools
//!
//! - [`config`] - environment-driven settings for the dev server
//! - [`dev_server`] - REST API over `CategoryTreeManager` for local testing
//!
//! The `dev-server` binary wires both together.

pub mod config;
pub mod dev_server;

pub use config::{DevServerConfig, StorageBackend};

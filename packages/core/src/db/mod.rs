//! Database Layer
//!
//! Persistence of category records behind the `CategoryStore` trait:
//!
//! - `InMemoryCategoryStore` - HashMap backend for tests and embedding
//! - `LibsqlCategoryStore` - relational table on embedded libsql (default
//!   `libsql-store` feature)
//!
//! Stores are atomic per record only; multi-record consistency is handled by
//! `CategoryTreeManager`.

mod category_store;
mod error;
#[cfg(feature = "libsql-store")]
mod libsql_store;
mod memory_store;

pub use category_store::CategoryStore;
pub use error::DatabaseError;
#[cfg(feature = "libsql-store")]
pub use libsql_store::LibsqlCategoryStore;
pub use memory_store::InMemoryCategoryStore;

//! CategoryStore Trait - Persistence Abstraction
//!
//! This module defines the `CategoryStore` trait that abstracts persistence of
//! category records. The tree manager only talks to this trait, so the same
//! tree logic runs on the in-memory map and on the libsql table.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so embedded and networked backends
//!    share one interface
//! 2. **Ownership Semantics**: `save` takes the record by value and hands back
//!    the stored version
//! 3. **Error Handling**: Uses `anyhow::Result` so each backend can attach its
//!    own context; the manager converts to `CategoryTreeError`
//! 4. **Single-node atomicity**: Every call is atomic for one record. Keeping
//!    several records consistent (moves, cascading deletes) is the manager's job
//!
//! # Examples
//!
//! ```rust
//! use folio_core::db::{CategoryStore, InMemoryCategoryStore};
//! use folio_core::models::CategoryNode;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn CategoryStore> = Arc::new(InMemoryCategoryStore::new());
//!
//!     let saved = store.save(CategoryNode::draft("Guides", None, None, 0)).await?;
//!     assert!(!saved.is_unsaved());
//!     assert!(store.exists_by_id(saved.id).await?);
//!     Ok(())
//! }
//! ```

use crate::models::{CategoryId, CategoryNode};
use crate::tree::path::descendant_prefix;
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for category persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the manager shares one store across
/// every task that calls it.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert or replace a category by id
    ///
    /// A record whose id is nil gets a freshly generated id. The stored record
    /// is returned.
    async fn save(&self, node: CategoryNode) -> Result<CategoryNode>;

    /// Get a category by id
    ///
    /// - `Ok(Some(node))` if it exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<CategoryNode>>;

    /// Every stored category, in no particular order
    async fn find_all(&self) -> Result<Vec<CategoryNode>>;

    /// Direct children of `parent_id`, or the roots when `parent_id` is `None`
    async fn find_by_parent_id(&self, parent_id: Option<CategoryId>) -> Result<Vec<CategoryNode>>;

    /// Every category whose path starts with `prefix`
    async fn find_by_path_prefix(&self, prefix: &str) -> Result<Vec<CategoryNode>>;

    /// Remove a category; removing an unknown id is a no-op
    async fn delete_by_id(&self, id: CategoryId) -> Result<()>;

    /// Whether a category with this id exists
    async fn exists_by_id(&self, id: CategoryId) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Whether any category names `id` as its parent
    async fn has_children(&self, id: CategoryId) -> Result<bool> {
        Ok(!self.find_by_parent_id(Some(id)).await?.is_empty())
    }

    /// Every strict descendant of `id`, found through the path prefix
    ///
    /// Returns an empty list when `id` is unknown.
    async fn find_descendants(&self, id: CategoryId) -> Result<Vec<CategoryNode>> {
        match self.find_by_id(id).await? {
            Some(node) => self.find_by_path_prefix(&descendant_prefix(&node.path)).await,
            None => Ok(Vec::new()),
        }
    }
}

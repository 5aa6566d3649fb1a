//! InMemoryCategoryStore - CategoryStore backed by a HashMap
//!
//! Used by tests, by the dev server when no database path is configured, and by
//! anyone embedding the tree without a relational database. Each call takes the
//! map lock once, which gives the per-record atomicity the trait promises.

use crate::db::category_store::CategoryStore;
use crate::models::{CategoryId, CategoryNode};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory category table keyed by id
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    categories: RwLock<HashMap<CategoryId, CategoryNode>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored categories
    pub async fn len(&self) -> usize {
        self.categories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.categories.read().await.is_empty()
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn save(&self, mut node: CategoryNode) -> Result<CategoryNode> {
        if node.is_unsaved() {
            node.id = Uuid::new_v4();
        }

        let mut categories = self.categories.write().await;
        categories.insert(node.id, node.clone());
        tracing::trace!("Stored category {} at path '{}'", node.id, node.path);
        Ok(node)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<CategoryNode>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<CategoryNode>> {
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn find_by_parent_id(&self, parent_id: Option<CategoryId>) -> Result<Vec<CategoryNode>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|node| node.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn find_by_path_prefix(&self, prefix: &str) -> Result<Vec<CategoryNode>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|node| node.path.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: CategoryId) -> Result<()> {
        self.categories.write().await.remove(&id);
        Ok(())
    }

    async fn exists_by_id(&self, id: CategoryId) -> Result<bool> {
        Ok(self.categories.read().await.contains_key(&id))
    }

    async fn has_children(&self, id: CategoryId) -> Result<bool> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .any(|node| node.parent_id == Some(id)))
    }
}

//! ContentLookup - read-only view of the content that lives in categories
//!
//! Articles and other content belong to a separate system. The tree manager
//! only needs to ask how much content a category holds (for counts in the tree
//! and for delete policies), and optionally to delete it.

use crate::models::CategoryId;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Query interface onto the external content system
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// Number of published items filed directly under `category_id`
    async fn count_published_content_in_category(&self, category_id: CategoryId) -> Result<u64>;

    /// Whether any item (published or not) is filed directly under `category_id`
    async fn has_any_content_in_category(&self, category_id: CategoryId) -> Result<bool>;

    /// Remove all content filed directly under `category_id`
    ///
    /// Called when a category is deleted with `ContentPolicy::Delete`. The
    /// default does nothing, for content systems that clean up on their own.
    async fn delete_content_in_category(&self, _category_id: CategoryId) -> Result<()> {
        Ok(())
    }
}

/// A content system with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalContent;

#[async_trait]
impl ContentLookup for NoExternalContent {
    async fn count_published_content_in_category(&self, _category_id: CategoryId) -> Result<u64> {
        Ok(0)
    }

    async fn has_any_content_in_category(&self, _category_id: CategoryId) -> Result<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ContentTally {
    published: u64,
    drafts: u64,
}

/// Per-category content counters kept in memory
///
/// Useful for tests and for the dev server, where there is no real content
/// system to ask.
#[derive(Debug, Default)]
pub struct InMemoryContentIndex {
    tallies: RwLock<HashMap<CategoryId, ContentTally>>,
    purged: RwLock<HashSet<CategoryId>>,
}

impl InMemoryContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` published items to a category
    pub async fn add_published(&self, category_id: CategoryId, count: u64) {
        self.tallies
            .write()
            .await
            .entry(category_id)
            .or_default()
            .published += count;
    }

    /// Add `count` unpublished items to a category
    pub async fn add_drafts(&self, category_id: CategoryId, count: u64) {
        self.tallies
            .write()
            .await
            .entry(category_id)
            .or_default()
            .drafts += count;
    }

    /// Whether `delete_content_in_category` was called for this category
    pub async fn was_purged(&self, category_id: CategoryId) -> bool {
        self.purged.read().await.contains(&category_id)
    }
}

#[async_trait]
impl ContentLookup for InMemoryContentIndex {
    async fn count_published_content_in_category(&self, category_id: CategoryId) -> Result<u64> {
        Ok(self
            .tallies
            .read()
            .await
            .get(&category_id)
            .map_or(0, |tally| tally.published))
    }

    async fn has_any_content_in_category(&self, category_id: CategoryId) -> Result<bool> {
        Ok(self
            .tallies
            .read()
            .await
            .get(&category_id)
            .is_some_and(|tally| tally.published + tally.drafts > 0))
    }

    async fn delete_content_in_category(&self, category_id: CategoryId) -> Result<()> {
        self.tallies.write().await.remove(&category_id);
        self.purged.write().await.insert(category_id);
        tracing::debug!("Purged content of category {}", category_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_drafts_count_as_content_but_not_as_published() {
        let index = InMemoryContentIndex::new();
        let id = Uuid::new_v4();

        assert!(!index.has_any_content_in_category(id).await.unwrap());

        index.add_drafts(id, 2).await;
        assert!(index.has_any_content_in_category(id).await.unwrap());
        assert_eq!(index.count_published_content_in_category(id).await.unwrap(), 0);

        index.add_published(id, 3).await;
        assert_eq!(index.count_published_content_in_category(id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_clears_and_records() {
        let index = InMemoryContentIndex::new();
        let id = Uuid::new_v4();
        index.add_published(id, 1).await;

        index.delete_content_in_category(id).await.unwrap();
        assert!(!index.has_any_content_in_category(id).await.unwrap());
        assert!(index.was_purged(id).await);
    }

    #[tokio::test]
    async fn test_no_external_content() {
        let lookup = NoExternalContent;
        let id = Uuid::new_v4();
        assert_eq!(lookup.count_published_content_in_category(id).await.unwrap(), 0);
        assert!(!lookup.has_any_content_in_category(id).await.unwrap());
        lookup.delete_content_in_category(id).await.unwrap();
    }
}

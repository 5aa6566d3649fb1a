//! Category Tree Manager
//!
//! Keeps the materialized-path hierarchy consistent across create, update,
//! move, and delete, and assembles list and tree views for readers.
//!
//! # Consistency
//!
//! The store only guarantees single-record atomicity. Multi-record edits (a
//! move rewriting a subtree, a cascading delete) are made safe against other
//! callers of the same manager by a tree-wide `RwLock`:
//!
//! - every mutation holds the write guard from its first read to its last write
//! - every read holds the read guard
//!
//! Clones share the lock, so all handles to one manager serialize together.
//! Two managers over the same store do not coordinate.
//!
//! # Failure Semantics
//!
//! A move persists the node first and then rewrites its descendants one by
//! one. If a descendant write fails the operation stops with
//! `DescendantRepairFailed`; writes already made stay in place.

use crate::config::CategoryTreeConfig;
use crate::db::CategoryStore;
use crate::models::{
    validate_name, CategoryId, CategoryNode, CategoryTreeNode, CategoryUpdate, ChildrenPolicy,
    ContentPolicy, DeletePolicy,
};
use crate::services::content_lookup::{ContentLookup, NoExternalContent};
use crate::services::error::CategoryTreeError;
use crate::services::events::CategoryEvent;
use crate::tree::path::{child_path, descendant_prefix, level_of, path_to_ids, rebase, root_path};
use crate::tree::would_create_cycle;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

type Result<T> = std::result::Result<T, CategoryTreeError>;

fn store_failed(e: anyhow::Error) -> CategoryTreeError {
    CategoryTreeError::store_failed(format!("{:#}", e))
}

fn lookup_failed(e: anyhow::Error) -> CategoryTreeError {
    CategoryTreeError::content_lookup_failed(format!("{:#}", e))
}

/// Sibling order: sort order, then creation time, then id
fn sibling_order(a: &CategoryNode, b: &CategoryNode) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Flat order: shallow levels first, siblings by `sibling_order`
fn level_order(a: &CategoryNode, b: &CategoryNode) -> Ordering {
    a.level.cmp(&b.level).then_with(|| sibling_order(a, b))
}

fn assemble(
    category: CategoryNode,
    children_of: &mut HashMap<CategoryId, Vec<CategoryNode>>,
    counts: &HashMap<CategoryId, u64>,
) -> CategoryTreeNode {
    let children = children_of
        .remove(&category.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| assemble(child, children_of, counts))
        .collect();

    CategoryTreeNode {
        content_count: counts.get(&category.id).copied(),
        category,
        children,
    }
}

/// Orchestrates every structural operation on the category tree
///
/// # Examples
///
/// ```rust
/// use folio_core::config::CategoryTreeConfig;
/// use folio_core::db::InMemoryCategoryStore;
/// use folio_core::services::CategoryTreeManager;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = CategoryTreeManager::new(
///         Arc::new(InMemoryCategoryStore::new()),
///         CategoryTreeConfig::default(),
///     )?;
///
///     let docs = manager.create("Docs", None, None, None).await?;
///     let guides = manager.create("Guides", None, Some(docs.id), None).await?;
///     assert_eq!(guides.path, format!("{}/{}", docs.id, guides.id));
///
///     let moved = manager.move_category(guides.id, None).await?;
///     assert_eq!(moved.level, 0);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct CategoryTreeManager {
    store: Arc<dyn CategoryStore>,

    /// Content system consulted by delete policies
    content: Arc<dyn ContentLookup>,

    config: CategoryTreeConfig,

    /// Serializes structural edits; shared by clones
    structure_lock: Arc<RwLock<()>>,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<CategoryEvent>,
}

impl CategoryTreeManager {
    /// Create a manager over `store` with no external content
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config.validate()` fails.
    pub fn new(store: Arc<dyn CategoryStore>, config: CategoryTreeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(CategoryTreeError::invalid_config)?;

        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);

        Ok(Self {
            store,
            content: Arc::new(NoExternalContent),
            config,
            structure_lock: Arc::new(RwLock::new(())),
            event_tx,
        })
    }

    /// Use `content` for delete-policy checks and content purges
    pub fn with_content_lookup(mut self, content: Arc<dyn ContentLookup>) -> Self {
        self.content = content;
        self
    }

    pub fn config(&self) -> &CategoryTreeConfig {
        &self.config
    }

    /// Underlying store, for callers that need raw access
    pub fn store(&self) -> &Arc<dyn CategoryStore> {
        &self.store
    }

    /// Subscribe to domain events
    ///
    /// The receiver only sees events sent after this call.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<CategoryEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors (no subscribers is normal)
    fn emit_event(&self, event: CategoryEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn fetch(&self, id: CategoryId) -> Result<CategoryNode> {
        self.store
            .find_by_id(id)
            .await
            .map_err(store_failed)?
            .ok_or_else(|| CategoryTreeError::category_not_found(id))
    }

    async fn fetch_parent(&self, parent_id: CategoryId) -> Result<CategoryNode> {
        self.store
            .find_by_id(parent_id)
            .await
            .map_err(store_failed)?
            .ok_or_else(|| CategoryTreeError::parent_not_found(parent_id))
    }

    async fn save(&self, node: CategoryNode) -> Result<CategoryNode> {
        self.store.save(node).await.map_err(store_failed)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a category, as a root or under `parent_id`
    ///
    /// The record is saved twice: once to obtain its id, then with the path
    /// and level derived from that id. If the second save fails the first
    /// record is removed again.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is blank or too long
    /// - `ParentNotFound` if `parent_id` does not exist
    pub async fn create(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        parent_id: Option<CategoryId>,
        sort_order: Option<i32>,
    ) -> Result<CategoryNode> {
        let name = name.into();
        validate_name(&name, self.config.max_name_length)?;

        let _guard = self.structure_lock.write().await;

        let parent = match parent_id {
            Some(parent_id) => Some(self.fetch_parent(parent_id).await?),
            None => None,
        };

        let draft = CategoryNode::draft(name, description, parent_id, sort_order.unwrap_or(0));
        let mut node = self.save(draft).await?;

        match &parent {
            Some(parent) => {
                node.path = child_path(&parent.path, node.id);
                node.level = parent.level + 1;
            }
            None => {
                node.path = root_path(node.id);
                node.level = 0;
            }
        }
        let node = match self.save(node.clone()).await {
            Ok(node) => node,
            Err(e) => {
                if let Err(cleanup) = self.store.delete_by_id(node.id).await {
                    tracing::warn!(
                        "Could not remove half-created category {}: {:#}",
                        node.id,
                        cleanup
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Created category {} ('{}') at level {}",
            node.id,
            node.name,
            node.level
        );
        self.emit_event(CategoryEvent::Created {
            category: node.clone(),
        });
        Ok(node)
    }

    /// Change the name of a category
    pub async fn rename(&self, id: CategoryId, new_name: impl Into<String>) -> Result<CategoryNode> {
        let new_name = new_name.into();
        validate_name(&new_name, self.config.max_name_length)?;
        self.update(
            id,
            CategoryUpdate {
                name: Some(new_name),
                ..Default::default()
            },
        )
        .await
    }

    /// Replace (or clear, with `None`) the description of a category
    pub async fn update_description(
        &self,
        id: CategoryId,
        description: Option<String>,
    ) -> Result<CategoryNode> {
        self.update(
            id,
            CategoryUpdate {
                description: Some(description),
                ..Default::default()
            },
        )
        .await
    }

    /// Change the sibling position of a category
    pub async fn set_sort_order(&self, id: CategoryId, sort_order: i32) -> Result<CategoryNode> {
        self.update(
            id,
            CategoryUpdate {
                sort_order: Some(sort_order),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply a sparse update, including an optional parent change
    ///
    /// The new parent is resolved and cycle-checked before anything is
    /// written, so a refused move leaves the field changes unsaved too. When
    /// the parent changes, the field changes go out with the node's own path
    /// write and `Moved` is followed by `Updated`. An update with no fields set
    /// returns the stored node unchanged.
    pub async fn update(&self, id: CategoryId, update: CategoryUpdate) -> Result<CategoryNode> {
        if let Some(name) = &update.name {
            validate_name(name, self.config.max_name_length)?;
        }

        let _guard = self.structure_lock.write().await;

        let mut node = self.fetch(id).await?;

        let new_parent = match update.parent {
            Some(new_parent_id) if new_parent_id != node.parent_id => {
                Some(self.check_move_target(&node, new_parent_id).await?)
            }
            _ => None,
        };

        let fields_changed =
            update.name.is_some() || update.description.is_some() || update.sort_order.is_some();
        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(sort_order) = update.sort_order {
            node.sort_order = sort_order;
        }

        let node = match new_parent {
            Some(new_parent) => self.relocate(node, new_parent).await?,
            None if fields_changed => {
                node.touch();
                self.save(node).await?
            }
            None => return Ok(node),
        };

        if fields_changed {
            tracing::debug!("Updated category {}", node.id);
            self.emit_event(CategoryEvent::Updated {
                category: node.clone(),
            });
        }
        Ok(node)
    }

    /// Re-parent a category, rewriting the path and level of its whole subtree
    ///
    /// Moving a category to the parent it already has is a no-op and returns
    /// the stored node untouched.
    ///
    /// # Errors
    ///
    /// - `CategoryNotFound` / `ParentNotFound`
    /// - `CircularReference` if the new parent is the node or inside its subtree
    ///   (nothing is written)
    /// - `DescendantRepairFailed` if a descendant could not be rewritten after
    ///   the node itself was saved
    pub async fn move_category(
        &self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<CategoryNode> {
        let _guard = self.structure_lock.write().await;
        self.move_unlocked(id, new_parent_id).await
    }

    /// Move algorithm; the caller holds the write guard
    async fn move_unlocked(
        &self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<CategoryNode> {
        let node = self.fetch(id).await?;
        if node.parent_id == new_parent_id {
            tracing::debug!("Category {} already under {:?}, nothing to move", id, new_parent_id);
            return Ok(node);
        }

        let new_parent = self.check_move_target(&node, new_parent_id).await?;
        self.relocate(node, new_parent).await
    }

    /// Resolve the new parent of `node` and refuse cycles; writes nothing
    async fn check_move_target(
        &self,
        node: &CategoryNode,
        new_parent_id: Option<CategoryId>,
    ) -> Result<Option<CategoryNode>> {
        let new_parent = match new_parent_id {
            Some(parent_id) => Some(self.fetch_parent(parent_id).await?),
            None => None,
        };

        if would_create_cycle(node, new_parent.as_ref()) {
            tracing::warn!(
                "Refused to move category {} under {:?}: target is inside its subtree",
                node.id,
                new_parent_id
            );
            return Err(CategoryTreeError::circular_reference(format!(
                "cannot move category {} under itself or one of its descendants",
                node.id
            )));
        }

        Ok(new_parent)
    }

    /// Save `node` under `new_parent` and rewrite its subtree
    ///
    /// `node` is the stored record, possibly carrying field edits; its path
    /// must still be the old one.
    async fn relocate(
        &self,
        mut node: CategoryNode,
        new_parent: Option<CategoryNode>,
    ) -> Result<CategoryNode> {
        let new_parent_id = new_parent.as_ref().map(|parent| parent.id);

        // Snapshot the subtree while the node still carries its old path
        let descendants = self
            .store
            .find_by_path_prefix(&descendant_prefix(&node.path))
            .await
            .map_err(store_failed)?;

        let old_parent_id = node.parent_id;
        let old_path = std::mem::take(&mut node.path);

        match &new_parent {
            Some(parent) => {
                node.path = child_path(&parent.path, node.id);
                node.level = parent.level + 1;
            }
            None => {
                node.path = root_path(node.id);
                node.level = 0;
            }
        }
        node.parent_id = new_parent_id;
        node.touch();
        let node = self.save(node).await?;

        let descendants_rewritten = descendants.len();
        for mut descendant in descendants {
            let failed_id = descendant.id;
            descendant.path = rebase(&descendant.path, &old_path, &node.path).ok_or_else(|| {
                CategoryTreeError::descendant_repair_failed(
                    node.id,
                    failed_id,
                    format!("path '{}' is not below '{}'", descendant.path, old_path),
                )
            })?;
            descendant.level = level_of(&descendant.path);
            descendant.touch();

            self.store.save(descendant).await.map_err(|e| {
                tracing::warn!(
                    "Move of category {} stopped at descendant {}: {:#}",
                    node.id,
                    failed_id,
                    e
                );
                CategoryTreeError::descendant_repair_failed(node.id, failed_id, format!("{:#}", e))
            })?;
            tracing::debug!("Rewrote path of descendant {}", failed_id);
        }

        tracing::info!(
            "Moved category {} from {:?} to {:?} ({} descendants rewritten)",
            node.id,
            old_parent_id,
            new_parent_id,
            descendants_rewritten
        );
        self.emit_event(CategoryEvent::Moved {
            category: node.clone(),
            old_parent_id,
            new_parent_id,
            descendants_rewritten,
        });
        Ok(node)
    }

    /// Delete a category under the given children and content policies
    ///
    /// - `ChildrenPolicy::Delete` removes the whole subtree, deepest first
    /// - `ChildrenPolicy::ReassignToParent` moves each direct child to this
    ///   category's parent (or to root) before removing it
    ///
    /// Every policy check runs before the first write, so a `Conflict` never
    /// leaves a partial delete behind.
    ///
    /// # Errors
    ///
    /// - `CategoryNotFound` if the category does not exist
    /// - `Conflict` if a `Prevent` policy applies
    pub async fn delete(&self, id: CategoryId, policy: DeletePolicy) -> Result<()> {
        let _guard = self.structure_lock.write().await;

        let node = self.fetch(id).await?;
        let children = self
            .store
            .find_by_parent_id(Some(id))
            .await
            .map_err(store_failed)?;

        if !children.is_empty() && policy.on_children == ChildrenPolicy::Prevent {
            tracing::warn!(
                "Refused to delete category {}: it has {} child categories",
                id,
                children.len()
            );
            return Err(CategoryTreeError::conflict(format!(
                "category {} has {} child categories",
                id,
                children.len()
            )));
        }

        let mut doomed = Vec::new();
        if !children.is_empty() && policy.on_children == ChildrenPolicy::Delete {
            doomed = self
                .store
                .find_by_path_prefix(&descendant_prefix(&node.path))
                .await
                .map_err(store_failed)?;
        }

        if policy.on_content == ContentPolicy::Prevent {
            for category in std::iter::once(&node).chain(doomed.iter()) {
                let has_content = self
                    .content
                    .has_any_content_in_category(category.id)
                    .await
                    .map_err(lookup_failed)?;
                if has_content {
                    tracing::warn!(
                        "Refused to delete category {}: category {} still holds content",
                        id,
                        category.id
                    );
                    return Err(CategoryTreeError::conflict(format!(
                        "category {} still holds content",
                        category.id
                    )));
                }
            }
        }

        if policy.on_children == ChildrenPolicy::ReassignToParent {
            for child in &children {
                self.move_unlocked(child.id, node.parent_id).await?;
            }
        }

        doomed.sort_by(|a, b| b.level.cmp(&a.level));
        for descendant in &doomed {
            self.remove_one(descendant.id, policy.on_content).await?;
        }
        self.remove_one(node.id, policy.on_content).await?;

        tracing::info!(
            "Deleted category {} ({} descendants removed, {} children reassigned)",
            id,
            doomed.len(),
            if policy.on_children == ChildrenPolicy::ReassignToParent {
                children.len()
            } else {
                0
            }
        );
        Ok(())
    }

    async fn remove_one(&self, id: CategoryId, on_content: ContentPolicy) -> Result<()> {
        if on_content == ContentPolicy::Delete {
            self.content
                .delete_content_in_category(id)
                .await
                .map_err(lookup_failed)?;
        }
        self.store.delete_by_id(id).await.map_err(store_failed)?;
        tracing::debug!("Removed category {}", id);
        self.emit_event(CategoryEvent::Deleted { id });
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a category, failing with `CategoryNotFound` if absent
    pub async fn get(&self, id: CategoryId) -> Result<CategoryNode> {
        let _guard = self.structure_lock.read().await;
        self.fetch(id).await
    }

    /// Get a category if it exists
    pub async fn find(&self, id: CategoryId) -> Result<Option<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        self.store.find_by_id(id).await.map_err(store_failed)
    }

    /// Root categories in sibling order
    pub async fn get_roots(&self) -> Result<Vec<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        let mut roots = self
            .store
            .find_by_parent_id(None)
            .await
            .map_err(store_failed)?;
        roots.sort_by(sibling_order);
        Ok(roots)
    }

    /// Every category, shallowest level first
    pub async fn list_flat(&self) -> Result<Vec<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        let mut all = self.store.find_all().await.map_err(store_failed)?;
        all.sort_by(level_order);
        Ok(all)
    }

    /// Direct children in sibling order
    pub async fn get_children(&self, id: CategoryId) -> Result<Vec<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        self.fetch(id).await?;
        let mut children = self
            .store
            .find_by_parent_id(Some(id))
            .await
            .map_err(store_failed)?;
        children.sort_by(sibling_order);
        Ok(children)
    }

    /// Every descendant (excluding the category itself), shallowest first
    pub async fn get_descendants(&self, id: CategoryId) -> Result<Vec<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        let node = self.fetch(id).await?;
        let mut descendants = self
            .store
            .find_by_path_prefix(&descendant_prefix(&node.path))
            .await
            .map_err(store_failed)?;
        descendants.sort_by(level_order);
        Ok(descendants)
    }

    /// The category's id followed by the ids of all its descendants
    ///
    /// Intended for filtering content by subtree.
    pub async fn get_descendant_ids(&self, id: CategoryId) -> Result<Vec<CategoryId>> {
        let descendants = self.get_descendants(id).await?;
        Ok(std::iter::once(id)
            .chain(descendants.into_iter().map(|d| d.id))
            .collect())
    }

    /// Ancestors root-first, excluding the category itself
    ///
    /// # Errors
    ///
    /// `MalformedPath` if the stored path does not decode.
    pub async fn get_ancestors(&self, id: CategoryId) -> Result<Vec<CategoryNode>> {
        let _guard = self.structure_lock.read().await;
        let node = self.fetch(id).await?;

        let mut ancestors = Vec::new();
        for ancestor_id in path_to_ids(&node.path)? {
            if ancestor_id == node.id {
                continue;
            }
            match self
                .store
                .find_by_id(ancestor_id)
                .await
                .map_err(store_failed)?
            {
                Some(ancestor) => ancestors.push(ancestor),
                None => tracing::warn!(
                    "Path of category {} names missing ancestor {}",
                    node.id,
                    ancestor_id
                ),
            }
        }
        Ok(ancestors)
    }

    pub async fn has_children(&self, id: CategoryId) -> Result<bool> {
        let _guard = self.structure_lock.read().await;
        self.store.has_children(id).await.map_err(store_failed)
    }

    /// Published content filed directly under the category
    pub async fn content_count(&self, id: CategoryId, lookup: &dyn ContentLookup) -> Result<u64> {
        let _guard = self.structure_lock.read().await;
        self.fetch(id).await?;
        lookup
            .count_published_content_in_category(id)
            .await
            .map_err(lookup_failed)
    }

    /// Materialize the whole forest, siblings ordered, optionally with counts
    ///
    /// Walks one level at a time through `find_by_parent_id`.
    ///
    /// # Errors
    ///
    /// `DepthLimitExceeded` if the tree is deeper than
    /// `CategoryTreeConfig::max_tree_depth`.
    pub async fn build_tree(
        &self,
        counts: Option<&dyn ContentLookup>,
    ) -> Result<Vec<CategoryTreeNode>> {
        let _guard = self.structure_lock.read().await;

        let mut roots = self
            .store
            .find_by_parent_id(None)
            .await
            .map_err(store_failed)?;
        roots.sort_by(sibling_order);

        let mut children_of: HashMap<CategoryId, Vec<CategoryNode>> = HashMap::new();
        let mut content_counts: HashMap<CategoryId, u64> = HashMap::new();
        let mut frontier: Vec<CategoryId> = roots.iter().map(|root| root.id).collect();
        let mut depth = 1u32;

        while !frontier.is_empty() {
            if depth > self.config.max_tree_depth {
                tracing::warn!(
                    "Category tree exceeds the depth limit of {}",
                    self.config.max_tree_depth
                );
                return Err(CategoryTreeError::depth_limit_exceeded(
                    self.config.max_tree_depth,
                ));
            }

            let mut next = Vec::new();
            for id in frontier {
                if let Some(lookup) = counts {
                    let count = lookup
                        .count_published_content_in_category(id)
                        .await
                        .map_err(lookup_failed)?;
                    content_counts.insert(id, count);
                }

                let mut children = self
                    .store
                    .find_by_parent_id(Some(id))
                    .await
                    .map_err(store_failed)?;
                if !children.is_empty() {
                    children.sort_by(sibling_order);
                    next.extend(children.iter().map(|child| child.id));
                    children_of.insert(id, children);
                }
            }

            frontier = next;
            depth += 1;
        }

        Ok(roots
            .into_iter()
            .map(|root| assemble(root, &mut children_of, &content_counts))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryCategoryStore;
    use crate::services::content_lookup::InMemoryContentIndex;

    fn create_test_manager() -> CategoryTreeManager {
        CategoryTreeManager::new(
            Arc::new(InMemoryCategoryStore::new()),
            CategoryTreeConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_root_and_child_paths() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), Some(3)).await.unwrap();

        assert_eq!(a.path, a.id.to_string());
        assert_eq!(a.level, 0);
        assert_eq!(b.path, format!("{}/{}", a.id, b.id));
        assert_eq!(b.level, 1);
        assert_eq!(b.sort_order, 3);
        assert_eq!(b.parent_id, Some(a.id));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name_and_missing_parent() {
        let manager = create_test_manager();

        let err = manager.create("   ", None, None, None).await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::Validation(_)));

        let missing = uuid::Uuid::new_v4();
        let err = manager
            .create("Orphan", None, Some(missing), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryTreeError::ParentNotFound { parent_id } if parent_id == missing));
        assert!(manager.list_flat().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_under_own_child_is_refused() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();

        let err = manager.move_category(a.id, Some(b.id)).await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::CircularReference { .. }));

        assert_eq!(manager.get(a.id).await.unwrap(), a);
        assert_eq!(manager.get(b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn test_move_to_root() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();

        let b = manager.move_category(b.id, None).await.unwrap();
        assert!(b.is_root());
        assert_eq!(b.level, 0);
        assert_eq!(b.path, b.id.to_string());
    }

    #[tokio::test]
    async fn test_move_to_current_parent_is_noop() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();

        let unchanged = manager.move_category(b.id, Some(a.id)).await.unwrap();
        assert_eq!(unchanged, b);
    }

    #[tokio::test]
    async fn test_ancestors_are_root_first() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();
        let c = manager.create("C", None, Some(b.id), None).await.unwrap();

        let ancestors: Vec<_> = manager
            .get_ancestors(c.id)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ancestors, vec![a.id, b.id]);
        assert!(manager.get_ancestors(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_fields_then_parent() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, None, None).await.unwrap();

        let updated = manager
            .update(
                b.id,
                CategoryUpdate {
                    name: Some("B2".to_string()),
                    description: Some(Some("moved".to_string())),
                    sort_order: Some(5),
                    parent: Some(Some(a.id)),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "B2");
        assert_eq!(updated.description.as_deref(), Some("moved"));
        assert_eq!(updated.sort_order, 5);
        assert_eq!(updated.parent_id, Some(a.id));
        assert_eq!(updated.level, 1);
    }

    #[tokio::test]
    async fn test_refused_parent_change_discards_field_changes() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();
        let mut rx = manager.subscribe_to_events();

        let err = manager
            .update(
                a.id,
                CategoryUpdate {
                    name: Some("Renamed".to_string()),
                    sort_order: Some(7),
                    parent: Some(Some(b.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryTreeError::CircularReference { .. }));

        let err = manager
            .update(
                a.id,
                CategoryUpdate {
                    name: Some("Renamed".to_string()),
                    parent: Some(Some(uuid::Uuid::new_v4())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryTreeError::ParentNotFound { .. }));

        assert_eq!(manager.get(a.id).await.unwrap(), a);
        assert_eq!(manager.get(b.id).await.unwrap(), b);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_can_clear_description() {
        let manager = create_test_manager();
        let a = manager
            .create("A", Some("About A".to_string()), None, None)
            .await
            .unwrap();

        let untouched = manager
            .update(
                a.id,
                CategoryUpdate {
                    name: Some("A2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(untouched.description.as_deref(), Some("About A"));

        let cleared = manager
            .update(
                a.id,
                CategoryUpdate {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(manager.get(a.id).await.unwrap().description, None);
    }

    #[tokio::test]
    async fn test_rename_touches_updated_at() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();

        let renamed = manager.rename(a.id, "Renamed").await.unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert!(renamed.updated_at >= a.updated_at);
        assert_eq!(renamed.path, a.path);

        let err = manager.rename(a.id, "").await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_prevent_keeps_store_unchanged() {
        let manager = create_test_manager();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();

        let err = manager.delete(a.id, DeletePolicy::strict()).await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::Conflict(_)));
        assert!(manager.find(a.id).await.unwrap().is_some());
        assert_eq!(manager.get_children(a.id).await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_delete_content_prevent_checks_whole_subtree() {
        let content = Arc::new(InMemoryContentIndex::new());
        let manager = create_test_manager().with_content_lookup(content.clone());
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();
        let c = manager.create("C", None, Some(b.id), None).await.unwrap();
        content.add_drafts(c.id, 1).await;

        let policy = DeletePolicy::new(ChildrenPolicy::Delete, ContentPolicy::Prevent);
        let err = manager.delete(a.id, policy).await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::Conflict(_)));
        assert_eq!(manager.list_flat().await.unwrap().len(), 3);

        let policy = DeletePolicy::new(ChildrenPolicy::Delete, ContentPolicy::Delete);
        manager.delete(a.id, policy).await.unwrap();
        assert!(manager.list_flat().await.unwrap().is_empty());
        assert!(content.was_purged(c.id).await);
    }

    #[tokio::test]
    async fn test_build_tree_orders_siblings_and_attaches_counts() {
        let content = InMemoryContentIndex::new();
        let manager = create_test_manager();
        let root = manager.create("Root", None, None, None).await.unwrap();
        let second = manager.create("Second", None, Some(root.id), Some(2)).await.unwrap();
        let first = manager.create("First", None, Some(root.id), Some(1)).await.unwrap();
        content.add_published(first.id, 4).await;

        let forest = manager.build_tree(Some(&content)).await.unwrap();
        assert_eq!(forest.len(), 1);
        let children: Vec<_> = forest[0].children.iter().map(|c| c.category.id).collect();
        assert_eq!(children, vec![first.id, second.id]);
        assert_eq!(forest[0].children[0].content_count, Some(4));
        assert_eq!(forest[0].content_count, Some(0));

        let bare = manager.build_tree(None).await.unwrap();
        assert_eq!(bare[0].content_count, None);
        assert_eq!(bare[0].subtree_size(), 3);
    }

    #[tokio::test]
    async fn test_build_tree_depth_limit() {
        let manager = CategoryTreeManager::new(
            Arc::new(InMemoryCategoryStore::new()),
            CategoryTreeConfig::default().with_max_tree_depth(2),
        )
        .unwrap();
        let a = manager.create("A", None, None, None).await.unwrap();
        let b = manager.create("B", None, Some(a.id), None).await.unwrap();
        assert_eq!(manager.build_tree(None).await.unwrap()[0].subtree_size(), 2);

        manager.create("C", None, Some(b.id), None).await.unwrap();
        let err = manager.build_tree(None).await.unwrap_err();
        assert!(matches!(err, CategoryTreeError::DepthLimitExceeded { limit: 2 }));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let result = CategoryTreeManager::new(
            Arc::new(InMemoryCategoryStore::new()),
            CategoryTreeConfig::default().with_max_tree_depth(0),
        );
        assert!(matches!(result, Err(CategoryTreeError::InvalidConfig(_))));
    }
}

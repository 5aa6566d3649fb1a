//! Tree Property Tests
//!
//! Runs every structural property of the category tree against both store
//! backends, so the in-memory map and the libsql table must behave the same.
//!
//! ## Test Coverage
//! - Path and level invariants after create and move
//! - Cycle refusal leaves both nodes untouched
//! - Ancestors are returned root-first
//! - Moving to root and no-op moves
//! - Subtree path rewrite on move (prefix and level delta)
//! - Delete policies: prevent, reassign to parent, cascade
//! - Flat and tree listings

use folio_core::db::{CategoryStore, InMemoryCategoryStore, LibsqlCategoryStore};
use folio_core::models::{CategoryNode, ChildrenPolicy, ContentPolicy, DeletePolicy};
use folio_core::services::{CategoryTreeError, CategoryTreeManager};
use folio_core::tree::{level_of, path_to_ids};
use folio_core::CategoryTreeConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn in_memory_manager() -> CategoryTreeManager {
    CategoryTreeManager::new(
        Arc::new(InMemoryCategoryStore::new()),
        CategoryTreeConfig::default(),
    )
    .unwrap()
}

async fn libsql_manager() -> (CategoryTreeManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = LibsqlCategoryStore::new(temp_dir.path().join("categories.db"))
        .await
        .unwrap();
    let store: Arc<dyn CategoryStore> = Arc::new(store);
    let manager = CategoryTreeManager::new(store, CategoryTreeConfig::default()).unwrap();
    (manager, temp_dir)
}

/// Check level and path invariants for every stored category
async fn assert_tree_consistent(manager: &CategoryTreeManager) {
    let all = manager.list_flat().await.unwrap();
    let by_id: HashMap<_, _> = all.iter().map(|n| (n.id, n)).collect();

    for node in &all {
        let ids = path_to_ids(&node.path).unwrap();
        assert_eq!(node.level as usize, ids.len() - 1, "level of {}", node.name);
        assert_eq!(node.level, level_of(&node.path), "level of {}", node.name);
        assert_eq!(ids.last(), Some(&node.id), "path of {} ends in its id", node.name);

        match node.parent_id {
            Some(parent_id) => {
                let parent = by_id.get(&parent_id).expect("parent exists");
                assert_eq!(node.path, format!("{}/{}", parent.path, node.id));
                assert_eq!(node.level, parent.level + 1, "level of {}", node.name);
            }
            None => assert_eq!(node.path, node.id.to_string()),
        }
    }
}

/// Runs one scenario against both backends
macro_rules! on_both_stores {
    ($scenario:ident, $memory_test:ident, $libsql_test:ident) => {
        #[tokio::test]
        async fn $memory_test() {
            $scenario(in_memory_manager()).await;
        }

        #[tokio::test]
        async fn $libsql_test() {
            let (manager, _temp_dir) = libsql_manager().await;
            $scenario(manager).await;
        }
    };
}

// ============================================================================
// Scenarios
// ============================================================================

async fn cycle_is_refused(manager: CategoryTreeManager) {
    let a = manager.create("A", None, None, None).await.unwrap();
    let b = manager.create("B", None, Some(a.id), None).await.unwrap();

    let err = manager.move_category(a.id, Some(b.id)).await.unwrap_err();
    assert!(matches!(err, CategoryTreeError::CircularReference { .. }));

    let err = manager.move_category(a.id, Some(a.id)).await.unwrap_err();
    assert!(matches!(err, CategoryTreeError::CircularReference { .. }));

    assert_eq!(manager.get(a.id).await.unwrap().path, a.path);
    assert_eq!(manager.get(b.id).await.unwrap().path, b.path);
    assert_tree_consistent(&manager).await;
}

on_both_stores!(cycle_is_refused, test_cycle_refused_in_memory, test_cycle_refused_libsql);

async fn ancestors_root_first(manager: CategoryTreeManager) {
    let a = manager.create("A", None, None, None).await.unwrap();
    let b = manager.create("B", None, Some(a.id), None).await.unwrap();
    let c = manager.create("C", None, Some(b.id), None).await.unwrap();

    let names: Vec<String> = manager
        .get_ancestors(c.id)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

on_both_stores!(ancestors_root_first, test_ancestors_in_memory, test_ancestors_libsql);

async fn move_to_root(manager: CategoryTreeManager) {
    let a = manager.create("A", None, None, None).await.unwrap();
    let b = manager.create("B", None, Some(a.id), None).await.unwrap();
    let c = manager.create("C", None, Some(b.id), None).await.unwrap();

    let b = manager.move_category(b.id, None).await.unwrap();
    assert_eq!(b.level, 0);
    assert_eq!(b.path, b.id.to_string());

    let c = manager.get(c.id).await.unwrap();
    assert_eq!(c.level, 1);
    assert_eq!(c.path, format!("{}/{}", b.id, c.id));
    assert!(manager.get_descendants(a.id).await.unwrap().is_empty());
    assert_tree_consistent(&manager).await;
}

on_both_stores!(move_to_root, test_move_to_root_in_memory, test_move_to_root_libsql);

async fn move_rewrites_subtree(manager: CategoryTreeManager) {
    // A -> B -> C -> D, and X -> Y
    let a = manager.create("A", None, None, None).await.unwrap();
    let b = manager.create("B", None, Some(a.id), None).await.unwrap();
    let c = manager.create("C", None, Some(b.id), None).await.unwrap();
    let d = manager.create("D", None, Some(c.id), None).await.unwrap();
    let x = manager.create("X", None, None, None).await.unwrap();
    let y = manager.create("Y", None, Some(x.id), None).await.unwrap();

    let old_prefix = b.path.clone();
    let moved = manager.move_category(b.id, Some(y.id)).await.unwrap();
    assert_eq!(moved.level, 2);
    assert_eq!(moved.path, format!("{}/{}", y.path, b.id));
    let delta = moved.level as i64 - b.level as i64;

    for before in [&c, &d] {
        let after = manager.get(before.id).await.unwrap();
        assert!(!after.path.starts_with(&old_prefix));
        assert!(after.path.starts_with(&moved.path));
        assert_eq!(after.level as i64, before.level as i64 + delta);
    }

    let subtree = manager.get_descendant_ids(x.id).await.unwrap();
    for id in [x.id, y.id, b.id, c.id, d.id] {
        assert!(subtree.contains(&id));
    }
    assert_eq!(subtree[0], x.id);
    assert_tree_consistent(&manager).await;
}

on_both_stores!(move_rewrites_subtree, test_move_subtree_in_memory, test_move_subtree_libsql);

async fn noop_move_changes_nothing(manager: CategoryTreeManager) {
    let a = manager.create("A", None, None, None).await.unwrap();
    let b = manager.create("B", None, Some(a.id), None).await.unwrap();
    let root = manager.create("Root", None, None, None).await.unwrap();

    let same_b = manager.move_category(b.id, Some(a.id)).await.unwrap();
    assert_eq!(same_b, b);
    let same_root = manager.move_category(root.id, None).await.unwrap();
    assert_eq!(same_root, root);
    assert_eq!(manager.get(b.id).await.unwrap().updated_at, b.updated_at);
}

on_both_stores!(noop_move_changes_nothing, test_noop_move_in_memory, test_noop_move_libsql);

async fn delete_prevent_with_child(manager: CategoryTreeManager) {
    let n = manager.create("N", None, None, None).await.unwrap();
    let child = manager.create("Child", None, Some(n.id), None).await.unwrap();

    let err = manager.delete(n.id, DeletePolicy::strict()).await.unwrap_err();
    assert!(matches!(err, CategoryTreeError::Conflict(_)));
    assert!(manager.find(n.id).await.unwrap().is_some());
    assert_eq!(manager.get_children(n.id).await.unwrap(), vec![child]);
}

on_both_stores!(delete_prevent_with_child, test_delete_prevent_in_memory, test_delete_prevent_libsql);

async fn delete_reassigns_children(manager: CategoryTreeManager) {
    let g = manager.create("G", None, None, None).await.unwrap();
    let n = manager.create("N", None, Some(g.id), None).await.unwrap();
    let c = manager.create("C", None, Some(n.id), None).await.unwrap();
    let leaf = manager.create("Leaf", None, Some(c.id), None).await.unwrap();

    let policy = DeletePolicy::new(ChildrenPolicy::ReassignToParent, ContentPolicy::Prevent);
    manager.delete(n.id, policy).await.unwrap();

    let c = manager.get(c.id).await.unwrap();
    assert_eq!(c.parent_id, Some(g.id));
    assert!(c.path.starts_with(&g.path));
    assert_eq!(c.level, 1);
    assert_eq!(manager.get(leaf.id).await.unwrap().level, 2);
    assert!(manager.find(n.id).await.unwrap().is_none());
    assert_tree_consistent(&manager).await;
}

on_both_stores!(delete_reassigns_children, test_delete_reassign_in_memory, test_delete_reassign_libsql);

async fn delete_root_reassigns_to_root(manager: CategoryTreeManager) {
    let n = manager.create("N", None, None, None).await.unwrap();
    let c = manager.create("C", None, Some(n.id), None).await.unwrap();

    let policy = DeletePolicy::new(ChildrenPolicy::ReassignToParent, ContentPolicy::Prevent);
    manager.delete(n.id, policy).await.unwrap();

    let c = manager.get(c.id).await.unwrap();
    assert!(c.is_root());
    assert_eq!(c.path, c.id.to_string());
}

on_both_stores!(delete_root_reassigns_to_root, test_delete_root_reassign_in_memory, test_delete_root_reassign_libsql);

async fn delete_cascades(manager: CategoryTreeManager) {
    let keep = manager.create("Keep", None, None, None).await.unwrap();
    let n = manager.create("N", None, None, None).await.unwrap();
    let c = manager.create("C", None, Some(n.id), None).await.unwrap();
    manager.create("D", None, Some(c.id), None).await.unwrap();
    manager.create("E", None, Some(n.id), None).await.unwrap();

    let policy = DeletePolicy::new(ChildrenPolicy::Delete, ContentPolicy::Prevent);
    manager.delete(n.id, policy).await.unwrap();

    let remaining: Vec<CategoryNode> = manager.list_flat().await.unwrap();
    assert_eq!(remaining, vec![keep]);
}

on_both_stores!(delete_cascades, test_delete_cascade_in_memory, test_delete_cascade_libsql);

async fn listings_are_ordered(manager: CategoryTreeManager) {
    let r2 = manager.create("R2", None, None, Some(2)).await.unwrap();
    let r1 = manager.create("R1", None, None, Some(1)).await.unwrap();
    let c = manager.create("C", None, Some(r2.id), Some(0)).await.unwrap();

    let flat: Vec<_> = manager
        .list_flat()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(flat, vec![r1.id, r2.id, c.id]);

    let roots: Vec<_> = manager
        .get_roots()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(roots, vec![r1.id, r2.id]);

    let forest = manager.build_tree(None).await.unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[1].category.id, r2.id);
    assert_eq!(forest[1].children[0].category.id, c.id);
    assert!(manager.has_children(r2.id).await.unwrap());
    assert!(!manager.has_children(r1.id).await.unwrap());
}

on_both_stores!(listings_are_ordered, test_listings_in_memory, test_listings_libsql);

// ============================================================================
// Not found
// ============================================================================

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let manager = in_memory_manager();
    let missing = uuid::Uuid::new_v4();

    assert!(manager.get(missing).await.unwrap_err().is_not_found());
    assert!(manager.rename(missing, "x").await.unwrap_err().is_not_found());
    assert!(manager.move_category(missing, None).await.unwrap_err().is_not_found());
    assert!(manager
        .delete(missing, DeletePolicy::strict())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(manager.get_children(missing).await.unwrap_err().is_not_found());

    let a = manager.create("A", None, None, None).await.unwrap();
    let err = manager.move_category(a.id, Some(missing)).await.unwrap_err();
    assert!(matches!(err, CategoryTreeError::ParentNotFound { .. }));
}

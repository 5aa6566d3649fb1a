//! Cycle detection for re-parenting
//!
//! Because every node carries its full ancestor path, "is the proposed parent
//! inside my own subtree" is a prefix comparison instead of a walk up the
//! parent chain.

use crate::models::CategoryNode;
use crate::tree::path::is_descendant_path;

/// Whether making `proposed_parent` the parent of `node` would create a cycle.
///
/// Both nodes must be fresh reads from the store; a stale path can hide a
/// descendant relationship created by a concurrent move.
///
/// - `None` (move to root) never creates a cycle
/// - a node cannot be its own parent
/// - a node cannot move under any of its descendants
pub fn would_create_cycle(node: &CategoryNode, proposed_parent: Option<&CategoryNode>) -> bool {
    let Some(parent) = proposed_parent else {
        return false;
    };

    parent.id == node.id || is_descendant_path(&parent.path, &node.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::path::{child_path, root_path};
    use uuid::Uuid;

    fn saved(parent: Option<&CategoryNode>) -> CategoryNode {
        let mut node = CategoryNode::draft("n", None, parent.map(|p| p.id), 0);
        node.id = Uuid::new_v4();
        match parent {
            Some(p) => {
                node.path = child_path(&p.path, node.id);
                node.level = p.level + 1;
            }
            None => node.path = root_path(node.id),
        }
        node
    }

    #[test]
    fn test_moving_to_root_is_safe() {
        let a = saved(None);
        let b = saved(Some(&a));
        assert!(!would_create_cycle(&b, None));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let a = saved(None);
        assert!(would_create_cycle(&a, Some(&a)));
    }

    #[test]
    fn test_descendant_parent_is_a_cycle() {
        let a = saved(None);
        let b = saved(Some(&a));
        let c = saved(Some(&b));

        assert!(would_create_cycle(&a, Some(&b)));
        assert!(would_create_cycle(&a, Some(&c)));
        assert!(would_create_cycle(&b, Some(&c)));
    }

    #[test]
    fn test_ancestor_and_unrelated_parents_are_safe() {
        let a = saved(None);
        let b = saved(Some(&a));
        let c = saved(Some(&b));
        let other = saved(None);

        assert!(!would_create_cycle(&c, Some(&a)));
        assert!(!would_create_cycle(&b, Some(&other)));
        assert!(!would_create_cycle(&other, Some(&c)));
    }
}

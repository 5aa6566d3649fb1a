//! Category Data Structures
//!
//! This module defines the `CategoryNode` record and the related request and
//! view types used by the category tree.
//!
//! # Architecture
//!
//! - **Self-reference by id**: a category points at its parent through
//!   `parent_id`, never through an embedded parent object
//! - **Derived children**: children are found by querying `parent_id`, they are
//!   never stored on the record
//! - **Materialized path**: `path` holds every ancestor id from the root down to
//!   the node itself, joined by `/`
//!
//! # Examples
//!
//! ```rust
//! use folio_core::models::{validate_name, CategoryNode, DEFAULT_MAX_NAME_LENGTH};
//!
//! let draft = CategoryNode::draft("Engineering", Some("All things build".to_string()), None, 0);
//! assert!(draft.is_unsaved());
//! assert!(validate_name(&draft.name, DEFAULT_MAX_NAME_LENGTH).is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a category. Generated by the store on first save.
pub type CategoryId = Uuid;

/// Default upper bound for category names (matches the `categories.name` column width
/// used by the CMS backends).
pub const DEFAULT_MAX_NAME_LENGTH: usize = 100;

/// Validation errors for category input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Category name must not be empty")]
    EmptyName,

    #[error("Category name exceeds {max} characters")]
    NameTooLong { max: usize },
}

/// A single node of the category tree.
///
/// # Fields
///
/// - `id`: Store-assigned identifier (nil until the first save)
/// - `name`: Display name, never empty
/// - `description`: Optional free text
/// - `parent_id`: Parent category, `None` for a root
/// - `level`: Depth in the tree, 0 for roots
/// - `path`: Materialized ancestor path including the node's own id
/// - `sort_order`: Sibling ordering key (not unique)
/// - `created_at` / `updated_at`: Timestamps, `updated_at` moves on every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: CategoryId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub parent_id: Option<CategoryId>,

    pub level: u32,

    pub path: String,

    #[serde(default)]
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CategoryNode {
    /// Create an unsaved category.
    ///
    /// The id is nil and the path is empty; both are filled in by the two-phase
    /// create in `CategoryTreeManager::create`.
    pub fn draft(
        name: impl Into<String>,
        description: Option<String>,
        parent_id: Option<CategoryId>,
        sort_order: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            name: name.into(),
            description,
            parent_id,
            level: 0,
            path: String::new(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the store has not assigned an id yet
    pub fn is_unsaved(&self) -> bool {
        self.id.is_nil()
    }

    /// Whether this category sits at the top of the tree
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Mark the record as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Check a category name against the emptiness and length rules
pub fn validate_name(name: &str, max_name_length: usize) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > max_name_length {
        return Err(ValidationError::NameTooLong {
            max: max_name_length,
        });
    }
    Ok(())
}

/// Sparse update applied by `CategoryTreeManager::update`
///
/// Only `Some` fields are changed. `description` and `parent` are double
/// options: `None` leaves the field alone, `Some(None)` clears the
/// description or moves the category to root.
///
/// # Examples
///
/// ```rust
/// # use folio_core::models::CategoryUpdate;
/// let update = CategoryUpdate {
///     name: Some("Renamed".to_string()),
///     ..Default::default()
/// };
/// assert!(!update.is_empty());
/// assert!(CategoryUpdate::default().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub sort_order: Option<i32>,

    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<Option<CategoryId>>,
}

impl CategoryUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.sort_order.is_none()
            && self.parent.is_none()
    }
}

/// Serde helper so an explicit `null` clears a field while an absent field
/// means "unchanged".
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            None => serializer.serialize_none(),
            Some(inner) => inner.serialize(serializer),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// What to do with the children of a category being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildrenPolicy {
    /// Refuse the delete when children exist
    #[default]
    Prevent,
    /// Delete the whole subtree
    Delete,
    /// Move each direct child up to the deleted category's parent
    ReassignToParent,
}

/// What to do with external content filed under a category being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentPolicy {
    /// Refuse the delete when content references the category
    #[default]
    Prevent,
    /// Ask the content collaborator to drop the content, then delete
    Delete,
}

/// Caller-supplied delete policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePolicy {
    #[serde(default)]
    pub on_children: ChildrenPolicy,

    #[serde(default)]
    pub on_content: ContentPolicy,
}

impl DeletePolicy {
    pub fn new(on_children: ChildrenPolicy, on_content: ContentPolicy) -> Self {
        Self {
            on_children,
            on_content,
        }
    }

    /// Refuse if anything hangs off the category
    pub fn strict() -> Self {
        Self::default()
    }
}

/// A category with its children attached, as produced by `build_tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: CategoryNode,

    /// Published content count, present only when a lookup was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_count: Option<u64>,

    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    /// Number of nodes in this subtree, including the node itself
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(CategoryTreeNode::subtree_size)
            .sum::<usize>()
    }
}

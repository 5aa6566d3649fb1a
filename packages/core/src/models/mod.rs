//! Data Models
//!
//! This module contains the data structures used by the category tree:
//!
//! - `CategoryNode` - The persisted category record
//! - `CategoryUpdate` - Sparse update request
//! - `DeletePolicy` - Caller-supplied rules for deleting categories
//! - `CategoryTreeNode` - Nested view produced by tree materialization

mod category;

pub use category::{
    validate_name, CategoryId, CategoryNode, CategoryTreeNode, CategoryUpdate, ChildrenPolicy,
    ContentPolicy, DeletePolicy, ValidationError, DEFAULT_MAX_NAME_LENGTH,
};

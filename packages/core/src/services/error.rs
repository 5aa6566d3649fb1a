//! Service Layer Error Types
//!
//! This module defines the error type returned by every `CategoryTreeManager`
//! operation. Store failures arrive as `anyhow::Error` and are flattened into
//! `StoreFailed` at the manager boundary.

use crate::models::{CategoryId, ValidationError};
use crate::tree::MalformedPathError;
use thiserror::Error;

/// Category tree operation errors
#[derive(Error, Debug)]
pub enum CategoryTreeError {
    /// Field validation failed (name empty or too long, self-parent)
    #[error("Category validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Category not found by ID
    #[error("Category not found: {id}")]
    CategoryNotFound { id: CategoryId },

    /// The requested parent does not exist
    #[error("Parent category not found: {parent_id}")]
    ParentNotFound { parent_id: CategoryId },

    /// The requested parent is the node itself or one of its descendants
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Delete refused by its children or content policy
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored path does not decode
    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),

    /// Tree traversal went deeper than the configured limit
    #[error("Category tree deeper than the configured limit of {limit} levels")]
    DepthLimitExceeded { limit: u32 },

    /// The underlying store returned an error
    #[error("Store operation failed: {0}")]
    StoreFailed(String),

    /// A move persisted the node but could not rewrite one of its descendants
    ///
    /// Writes made before the failure are not rolled back.
    #[error("Moved category {moved_id} but failed to repair descendant {failed_id}: {reason}")]
    DescendantRepairFailed {
        moved_id: CategoryId,
        failed_id: CategoryId,
        reason: String,
    },

    /// The external content lookup returned an error
    #[error("Content lookup failed: {0}")]
    ContentLookupFailed(String),

    /// The manager was constructed with an unusable configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CategoryTreeError {
    /// Create a category not found error
    pub fn category_not_found(id: CategoryId) -> Self {
        Self::CategoryNotFound { id }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: CategoryId) -> Self {
        Self::ParentNotFound { parent_id }
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a depth limit error
    pub fn depth_limit_exceeded(limit: u32) -> Self {
        Self::DepthLimitExceeded { limit }
    }

    /// Create a store failure error
    pub fn store_failed(msg: impl Into<String>) -> Self {
        Self::StoreFailed(msg.into())
    }

    /// Create a descendant repair error
    pub fn descendant_repair_failed(
        moved_id: CategoryId,
        failed_id: CategoryId,
        reason: impl Into<String>,
    ) -> Self {
        Self::DescendantRepairFailed {
            moved_id,
            failed_id,
            reason: reason.into(),
        }
    }

    /// Create a content lookup error
    pub fn content_lookup_failed(msg: impl Into<String>) -> Self {
        Self::ContentLookupFailed(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for `CategoryNotFound` and `ParentNotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound { .. } | Self::ParentNotFound { .. }
        )
    }

    /// True when the caller's request was at fault rather than the backend
    pub fn is_client_error(&self) -> bool {
        self.is_not_found()
            || matches!(
                self,
                Self::Validation(_)
                    | Self::CircularReference { .. }
                    | Self::Conflict(_)
                    | Self::MalformedPath(_)
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_classification() {
        let id = Uuid::new_v4();
        assert!(CategoryTreeError::category_not_found(id).is_not_found());
        assert!(CategoryTreeError::parent_not_found(id).is_client_error());
        assert!(CategoryTreeError::conflict("has children").is_client_error());
        assert!(CategoryTreeError::from(ValidationError::EmptyName).is_client_error());

        assert!(!CategoryTreeError::store_failed("disk full").is_client_error());
        assert!(!CategoryTreeError::descendant_repair_failed(id, id, "io").is_client_error());
        assert!(!CategoryTreeError::depth_limit_exceeded(64).is_not_found());
    }

    #[test]
    fn test_messages_name_the_ids() {
        let moved = Uuid::new_v4();
        let failed = Uuid::new_v4();
        let message =
            CategoryTreeError::descendant_repair_failed(moved, failed, "write refused").to_string();
        assert!(message.contains(&moved.to_string()));
        assert!(message.contains(&failed.to_string()));
        assert!(message.contains("write refused"));
    }
}

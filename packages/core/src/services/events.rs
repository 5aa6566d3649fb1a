//! Domain Events for CategoryTreeManager
//!
//! The manager broadcasts one event per successful structural change so that
//! caches, search indexes, or a UI layer can follow the tree without polling.
//!
//! # Architecture
//!
//! Events go out on a tokio broadcast channel. Every subscriber receives every
//! event sent after it subscribed; a subscriber that falls behind by more than
//! the channel capacity gets `RecvError::Lagged` and should reload the tree.
//!
//! # Event Flow
//!
//! 1. CategoryTreeManager finishes a mutation (all writes done)
//! 2. The event is sent on the broadcast channel
//! 3. Subscribers receive it asynchronously
//!
//! Failed operations emit nothing. A move that fails while rewriting
//! descendants emits nothing either, even though the moved node was written.

use crate::models::{CategoryId, CategoryNode};
use serde::{Deserialize, Serialize};

/// Structural change notifications emitted by CategoryTreeManager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CategoryEvent {
    /// A category was created
    Created { category: CategoryNode },

    /// Name, description, or sort order changed
    Updated { category: CategoryNode },

    /// A category was re-parented along with its subtree
    #[serde(rename_all = "camelCase")]
    Moved {
        category: CategoryNode,
        old_parent_id: Option<CategoryId>,
        new_parent_id: Option<CategoryId>,
        descendants_rewritten: usize,
    },

    /// A category was removed
    Deleted { id: CategoryId },
}

impl CategoryEvent {
    /// Stable event name, e.g. for logging or forwarding to a frontend
    pub fn event_type(&self) -> &'static str {
        match self {
            CategoryEvent::Created { .. } => "category:created",
            CategoryEvent::Updated { .. } => "category:updated",
            CategoryEvent::Moved { .. } => "category:moved",
            CategoryEvent::Deleted { .. } => "category:deleted",
        }
    }

    /// Id of the category the event is about
    pub fn category_id(&self) -> CategoryId {
        match self {
            CategoryEvent::Created { category }
            | CategoryEvent::Updated { category }
            | CategoryEvent::Moved { category, .. } => category.id,
            CategoryEvent::Deleted { id } => *id,
        }
    }
}

//! Business Services
//!
//! - `CategoryTreeManager` - create, update, move, delete, and tree views
//! - `ContentLookup` - interface onto the external content system
//! - `CategoryEvent` - domain events broadcast after each structural change
//!
//! Services coordinate between the store layer and callers, enforcing the tree
//! invariants that a single store write cannot.

pub mod category_tree_manager;
pub mod content_lookup;
pub mod error;
pub mod events;

pub use category_tree_manager::CategoryTreeManager;
pub use content_lookup::{ContentLookup, InMemoryContentIndex, NoExternalContent};
pub use error::CategoryTreeError;
pub use events::CategoryEvent;

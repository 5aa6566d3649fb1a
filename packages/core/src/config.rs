//! Category tree configuration

use crate::models::DEFAULT_MAX_NAME_LENGTH;
use serde::{Deserialize, Serialize};

/// Default cap on tree depth for `build_tree`
pub const DEFAULT_MAX_TREE_DEPTH: u32 = 64;

/// Default capacity of the domain event channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Configuration for `CategoryTreeManager`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryTreeConfig {
    /// Deepest level `build_tree` will descend to (default: 64)
    pub max_tree_depth: u32,
    /// Maximum category name length in characters (default: 100)
    pub max_name_length: usize,
    /// Buffered events per subscriber before it lags (default: 128)
    pub event_channel_capacity: usize,
}

impl Default for CategoryTreeConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl CategoryTreeConfig {
    /// Same defaults with a different depth cap
    pub fn with_max_tree_depth(mut self, max_tree_depth: u32) -> Self {
        self.max_tree_depth = max_tree_depth;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_tree_depth == 0 {
            return Err("max_tree_depth must be at least 1".to_string());
        }
        if self.max_name_length == 0 {
            return Err("max_name_length must be at least 1".to_string());
        }
        // tokio::sync::broadcast::channel panics on zero capacity
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

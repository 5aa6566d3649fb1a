//! Tree primitives
//!
//! Pure helpers shared by the store backends and the tree manager:
//!
//! - [`path`] - materialized path encoding and decoding
//! - [`cycle`] - cycle detection for re-parenting

pub mod cycle;
pub mod path;

pub use cycle::would_create_cycle;
pub use path::{
    child_path, level_of, path_to_ids, root_path, MalformedPathError, PATH_DELIMITER,
};

//! Materialized path encoding
//!
//! A path lists every id from the root down to and including the node itself,
//! joined by [`PATH_DELIMITER`]:
//!
//! - root: `"<root-id>"`
//! - child: `"<parent path>/<child-id>"`
//!
//! Everything here is pure string work; no store access.

use crate::models::CategoryId;
use thiserror::Error;
use uuid::Uuid;

/// Separator between ids in a materialized path
pub const PATH_DELIMITER: char = '/';

/// A path segment could not be decoded into a category id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed category path '{path}': invalid segment '{segment}'")]
pub struct MalformedPathError {
    pub path: String,
    pub segment: String,
}

/// Path of a root category
pub fn root_path(id: CategoryId) -> String {
    id.to_string()
}

/// Path of a category placed under a parent with `parent_path`
pub fn child_path(parent_path: &str, id: CategoryId) -> String {
    let mut path = String::with_capacity(parent_path.len() + 37);
    path.push_str(parent_path.trim_end_matches(PATH_DELIMITER));
    path.push(PATH_DELIMITER);
    path.push_str(&id.to_string());
    path
}

/// Decode a path into its ids, root first.
///
/// Empty segments are skipped, so `"/a/b/"` decodes the same as `"a/b"`.
///
/// # Examples
///
/// ```rust
/// # use folio_core::tree::path::{child_path, path_to_ids, root_path};
/// # use uuid::Uuid;
/// let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
/// let path = child_path(&root_path(a), b);
/// assert_eq!(path_to_ids(&path).unwrap(), vec![a, b]);
/// assert!(path_to_ids("not-an-id").is_err());
/// ```
pub fn path_to_ids(path: &str) -> Result<Vec<CategoryId>, MalformedPathError> {
    path.split(PATH_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            Uuid::parse_str(segment).map_err(|_| MalformedPathError {
                path: path.to_string(),
                segment: segment.to_string(),
            })
        })
        .collect()
}

/// Depth implied by a path (`number of ids - 1`), without decoding the ids
pub fn level_of(path: &str) -> u32 {
    let segments = path
        .split(PATH_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .count() as u32;
    segments.saturating_sub(1)
}

/// Prefix that every strict descendant of a node with `path` starts with
pub fn descendant_prefix(path: &str) -> String {
    let mut prefix = path.trim_end_matches(PATH_DELIMITER).to_string();
    prefix.push(PATH_DELIMITER);
    prefix
}

/// Whether `candidate` lies strictly below `ancestor`
pub fn is_descendant_path(candidate: &str, ancestor: &str) -> bool {
    !ancestor.is_empty() && candidate.starts_with(&descendant_prefix(ancestor))
}

/// Replace the leading `old_prefix` of `path` with `new_prefix`.
///
/// Returns `None` when `path` is neither `old_prefix` itself nor below it.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if path == old_prefix {
        return Some(new_prefix.to_string());
    }
    if !is_descendant_path(path, old_prefix) {
        return None;
    }
    let rest = &path[old_prefix.trim_end_matches(PATH_DELIMITER).len()..];
    let mut rebased = new_prefix.trim_end_matches(PATH_DELIMITER).to_string();
    rebased.push_str(rest);
    Some(rebased)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_child_paths() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let pa = root_path(a);
        let pb = child_path(&pa, b);
        let pc = child_path(&pb, c);

        assert_eq!(pa, a.to_string());
        assert_eq!(pb, format!("{}/{}", a, b));
        assert_eq!(pc, format!("{}/{}/{}", a, b, c));
        assert_eq!(level_of(&pa), 0);
        assert_eq!(level_of(&pc), 2);
        assert_eq!(path_to_ids(&pc).unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_path_to_ids_tolerates_surrounding_delimiters() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let legacy = format!("/{}/{}/", a, b);
        assert_eq!(path_to_ids(&legacy).unwrap(), vec![a, b]);
        assert_eq!(level_of(&legacy), 1);
        assert!(path_to_ids("").unwrap().is_empty());
    }

    #[test]
    fn test_path_to_ids_reports_bad_segment() {
        let a = Uuid::new_v4();
        let err = path_to_ids(&format!("{}/42", a)).unwrap_err();
        assert_eq!(err.segment, "42");
    }

    #[test]
    fn test_descendant_check_uses_delimiter_boundary() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pa = root_path(a);
        let pb = child_path(&pa, b);

        assert!(is_descendant_path(&pb, &pa));
        assert!(!is_descendant_path(&pa, &pa));
        assert!(!is_descendant_path(&pa, &pb));
        // A sibling whose path merely shares a textual prefix is not a descendant
        assert!(!is_descendant_path(&format!("{}x", pa), &pa));
        assert!(!is_descendant_path(&pa, ""));
    }

    #[test]
    fn test_rebase() {
        let (a, b, c, d) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let old_prefix = child_path(&root_path(a), b);
        let descendant = child_path(&old_prefix, c);
        let new_prefix = child_path(&root_path(d), b);

        assert_eq!(
            rebase(&descendant, &old_prefix, &new_prefix).unwrap(),
            child_path(&new_prefix, c)
        );
        assert_eq!(
            rebase(&old_prefix, &old_prefix, &new_prefix).unwrap(),
            new_prefix
        );
        assert!(rebase(&root_path(d), &old_prefix, &new_prefix).is_none());
    }
}

//! Object name validation and share path helpers.
//!
//! Object names are `/`-separated. Names with empty segments (leading,
//! trailing or doubled separators), relative segments (`.` or `..`) or
//! control characters have no unambiguous share path and are rejected
//! before anything is fetched.

use crate::error::{MirrorError, MirrorResult};

/// Segment separator shared by object names and share paths.
pub const SEPARATOR: char = '/';

/// Checks that `name` can be mapped onto a share path.
pub fn validate_object_name(name: &str) -> MirrorResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.starts_with(SEPARATOR) {
        "name starts with '/'"
    } else if name.ends_with(SEPARATOR) {
        "name ends with '/'"
    } else if name.split(SEPARATOR).any(str::is_empty) {
        "name contains an empty path segment"
    } else if name.split(SEPARATOR).any(|s| s == "." || s == "..") {
        "name contains a relative path segment"
    } else if name.chars().any(char::is_control) {
        "name contains a control character"
    } else {
        return Ok(());
    };

    Err(MirrorError::InvalidObjectName {
        name: name.to_string(),
        reason,
    })
}

/// Yields every proper directory prefix of `name`, shallowest first.
///
/// `"a/b/c.txt"` yields `"a"` then `"a/b"`; a name without a separator
/// yields nothing.
pub fn directory_prefixes(name: &str) -> impl Iterator<Item = &str> {
    name.match_indices(SEPARATOR).map(move |(idx, _)| &name[..idx])
}

/// Joins a child entry name onto its parent directory path.
///
/// The share root is the empty path, so root children keep their bare name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

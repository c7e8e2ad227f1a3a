//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `normalize_lexically` - resolve `.` and `..` without touching the disk
//! - `relativize` - component-wise relative path between two absolute paths

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Lexical normalization if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// use crate::utils::path::normalize_path;
/// let abs = normalize_path(Path::new("./target/classes"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            normalize_lexically(path)
        } else {
            std::env::current_dir().map_or_else(
                |_| normalize_lexically(path),
                |cwd| normalize_lexically(&cwd.join(path)),
            )
        }
    })
}

/// Resolve `.` and `..` components purely lexically.
///
/// Source roots declared by a descriptor may not exist yet, so they
/// cannot go through `canonicalize()`. A `..` at the root is dropped.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Relative path from `base` to `path`.
///
/// Both inputs are expected to be absolute and normalized. The result walks
/// up with `..` for every `base` component not shared with `path`:
///
/// ```text
/// relativize("/p/target/classes", "/p/target/classes/com/a") -> "com/a"
/// relativize("/p/target/classes", "/p/src/main/java")        -> "../../src/main/java"
/// ```
pub fn relativize(base: &Path, path: &Path) -> PathBuf {
    let base: Vec<_> = base.components().collect();
    let path: Vec<_> = path.components().collect();

    let common = base
        .iter()
        .zip(path.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component.as_os_str());
    }
    out
}

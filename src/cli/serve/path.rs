//! URL to filesystem path resolution for the static downstream chain.

use std::path::{Path, PathBuf};

/// Resolve a request URL under `serve_root`, serving `index.html` for directories.
///
/// Anything that escapes `serve_root` after decoding and symlink resolution
/// is rejected.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    let index = canonical.join("index.html");
    (canonical.is_dir() && index.is_file()).then_some(index)
}

/// Decode, strip query and fragment, trim slashes.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn webapp() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("app")).unwrap();
        fs::write(temp.path().join("index.html"), "<html></html>").unwrap();
        fs::write(temp.path().join("app/host page.html"), "host").unwrap();
        temp
    }

    #[test]
    fn test_resolve_file_and_index() {
        let temp = webapp();
        let root = temp.path().canonicalize().unwrap();

        assert_eq!(
            resolve_path("/app/host%20page.html?x=1", temp.path()),
            Some(root.join("app/host page.html"))
        );
        assert_eq!(resolve_path("/", temp.path()), Some(root.join("index.html")));
        assert_eq!(resolve_path("/app/", temp.path()), None);
        assert_eq!(resolve_path("/missing.js", temp.path()), None);
    }

    #[test]
    fn test_rejects_traversal() {
        let temp = webapp();
        let inner = temp.path().join("app");
        assert_eq!(resolve_path("/../index.html", &inner), None);
        assert_eq!(resolve_path("/%2e%2e/index.html", &inner), None);
    }
}

//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/app/src/main/java/  ← cwd
/// /home/user/app/stagehand.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Resolve a configured path against the project root, expanding `~`.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    crate::utils::path::normalize_path(&full_path)
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_upward() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src/main/java");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("stagehand.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("stagehand.toml")).unwrap();
        assert_eq!(found, temp.path().join("stagehand.toml"));
        assert!(find_upward(&nested, Path::new("missing.toml")).is_none());
    }

    #[test]
    fn test_find_absolute() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("custom.toml");
        assert!(find_config_file(&config).is_none());

        fs::write(&config, "").unwrap();
        assert_eq!(find_config_file(&config), Some(config));
    }

    #[test]
    fn test_resolve_path_relative_and_wildcard() {
        let root = Path::new("/p/app");
        assert_eq!(
            resolve_path(Path::new("target/../target/classes"), root),
            PathBuf::from("/p/app/target/classes")
        );
        assert_eq!(
            resolve_path(Path::new("lib/*"), root),
            PathBuf::from("/p/app/lib/*")
        );
        assert_eq!(
            resolve_path(Path::new("/abs/dir"), root),
            PathBuf::from("/abs/dir")
        );
    }
}

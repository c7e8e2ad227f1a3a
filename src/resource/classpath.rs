//! Ordered resource lookup over directories and archives.

use super::{ArchiveFs, ResourceError, ResourceLocator};
use crate::debug;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Archive file extensions recognized on the classpath.
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassPathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ClassPathEntry {
    /// Classify a path by what it is on disk, falling back to its extension.
    pub fn classify(path: &Path) -> Self {
        if path.is_dir() || !is_archive_path(path) {
            Self::Directory(path.to_path_buf())
        } else {
            Self::Archive(path.to_path_buf())
        }
    }
}

/// Ordered search path. The first entry containing a resource wins.
pub struct ClassPath {
    entries: Vec<ClassPathEntry>,
    /// File names per archive, built on first lookup.
    index: Mutex<FxHashMap<PathBuf, Arc<FxHashSet<String>>>>,
}

impl ClassPath {
    pub fn new(entries: Vec<ClassPathEntry>) -> Self {
        Self {
            entries,
            index: Mutex::new(FxHashMap::default()),
        }
    }

    /// Build from configured paths, expanding `dir/*` into every archive in `dir`.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let mut entries = Vec::new();
        for path in paths {
            if path.file_name().is_some_and(|name| name == "*") {
                let dir = path.parent().unwrap_or(Path::new("."));
                entries.extend(expand_wildcard(dir).into_iter().map(ClassPathEntry::Archive));
            } else {
                entries.push(ClassPathEntry::classify(path));
            }
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> &[ClassPathEntry] {
        &self.entries
    }

    /// Find `name` (slash-separated, no leading slash).
    ///
    /// Entries missing on disk are skipped. An archive that exists but
    /// cannot be opened is an error. A name in locator wire form bypasses
    /// the search; a malformed one is an error.
    pub fn locate(&self, name: &str) -> Result<Option<ResourceLocator>, ResourceError> {
        if ResourceLocator::is_wire_form(name) {
            return locate_wire_form(name);
        }

        let name = name.trim_start_matches('/');
        for entry in &self.entries {
            match entry {
                ClassPathEntry::Directory(dir) => {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        return Ok(Some(ResourceLocator::Filesystem(candidate)));
                    }
                }
                ClassPathEntry::Archive(archive) => {
                    if !archive.is_file() {
                        continue;
                    }
                    if self.archive_names(archive)?.contains(name) {
                        return Ok(Some(ResourceLocator::archive(archive, name)));
                    }
                }
            }
        }
        debug!("classpath"; "{} not found in {} entries", name, self.entries.len());
        Ok(None)
    }

    /// Read the bytes of a located resource.
    pub fn read(locator: &ResourceLocator) -> Result<Vec<u8>, ResourceError> {
        match locator {
            ResourceLocator::Filesystem(path) => {
                fs::read(path).map_err(|e| ResourceError::Io(path.clone(), e))
            }
            ResourceLocator::Archive { archive, entry } => ArchiveFs::open(archive)?.read(entry),
        }
    }

    fn archive_names(&self, archive: &Path) -> Result<Arc<FxHashSet<String>>, ResourceError> {
        if let Some(names) = self.index.lock().get(archive) {
            return Ok(Arc::clone(names));
        }

        let names: FxHashSet<String> = ArchiveFs::open(archive)?.walk("/").into_iter().collect();
        let names = Arc::new(names);
        self.index
            .lock()
            .insert(archive.to_path_buf(), Arc::clone(&names));
        Ok(names)
    }
}

/// Resolve an explicit locator, checking that it points at a file.
fn locate_wire_form(raw: &str) -> Result<Option<ResourceLocator>, ResourceError> {
    let locator = ResourceLocator::parse(raw)?;
    let found = match &locator {
        ResourceLocator::Filesystem(path) => path.is_file(),
        ResourceLocator::Archive { archive, entry } => {
            archive.is_file() && ArchiveFs::open(archive)?.is_file(entry)
        }
    };
    if !found {
        debug!("classpath"; "{} does not exist", locator);
    }
    Ok(found.then_some(locator))
}

fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn expand_wildcard(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut archives: Vec<PathBuf> = read
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_archive_path(path))
        .collect();
    archives.sort();
    archives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{LocatorError, archive::tests::write_zip};
    use tempfile::TempDir;

    #[test]
    fn test_directory_wins_over_later_archive() {
        let temp = TempDir::new().unwrap();
        let classes = temp.path().join("classes");
        fs::create_dir_all(classes.join("com/app")).unwrap();
        fs::write(classes.join("com/app/App.gwt.xml"), "<module/>").unwrap();

        let jar = temp.path().join("app.jar");
        write_zip(&jar, &[("com/app/App.gwt.xml", b"<module></module>")]);

        let cp = ClassPath::from_paths(&[classes.clone(), jar]);
        let found = cp.locate("com/app/App.gwt.xml").unwrap().unwrap();
        assert_eq!(
            found,
            ResourceLocator::Filesystem(classes.join("com/app/App.gwt.xml"))
        );
    }

    #[test]
    fn test_locate_in_archive() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("user.jar");
        write_zip(&jar, &[("com/google/User.gwt.xml", b"<module/>")]);

        let cp = ClassPath::from_paths(&[temp.path().join("missing-dir"), jar.clone()]);
        let found = cp.locate("com/google/User.gwt.xml").unwrap().unwrap();
        assert_eq!(found, ResourceLocator::archive(&jar, "com/google/User.gwt.xml"));
        assert_eq!(ClassPath::read(&found).unwrap(), b"<module/>");

        assert!(cp.locate("com/google/Other.gwt.xml").unwrap().is_none());
    }

    #[test]
    fn test_wildcard_expansion_sorted() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        write_zip(&lib.join("b.jar"), &[("b.txt", b"b")]);
        write_zip(&lib.join("a.zip"), &[("a.txt", b"a")]);
        fs::write(lib.join("notes.txt"), "ignored").unwrap();

        let cp = ClassPath::from_paths(&[lib.join("*")]);
        assert_eq!(
            cp.entries(),
            &[
                ClassPathEntry::Archive(lib.join("a.zip")),
                ClassPathEntry::Archive(lib.join("b.jar")),
            ]
        );
    }

    #[test]
    fn test_locate_wire_form() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("dev.jar");
        write_zip(&jar, &[("com/google/Bridge.java", b"class Bridge {}")]);
        let cp = ClassPath::from_paths(&[]);

        let pinned = ResourceLocator::archive(&jar, "com/google/Bridge.java");
        assert_eq!(cp.locate(&pinned.to_string()).unwrap(), Some(pinned));

        let absent = ResourceLocator::archive(&jar, "com/google/Other.java");
        assert_eq!(cp.locate(&absent.to_string()).unwrap(), None);

        assert!(matches!(
            cp.locate("jar:file:///p/lib/dev.jar"),
            Err(ResourceError::Locator(LocatorError::MissingSeparator(_)))
        ));
    }

    #[test]
    fn test_corrupt_archive_is_error() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("broken.jar");
        fs::write(&jar, "not a zip").unwrap();

        let cp = ClassPath::from_paths(&[jar]);
        assert!(matches!(
            cp.locate("anything"),
            Err(ResourceError::Archive(..))
        ));
    }
}

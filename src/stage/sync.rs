//! Incremental staging of changed classes.
//!
//! Stale staged copies of changed and deleted classes are removed first.
//! Then changed and added classes are copied in from the live source root,
//! but only when they fall under a recorded module source root.

use super::SourceRoots;
use crate::{debug, log, utils::path::relativize};
use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

/// Source file suffix for a class name.
const SOURCE_SUFFIX: &str = ".java";

/// Fully-qualified class names touched by one reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub changed: BTreeSet<String>,
    pub added: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed.len() + self.added.len() + self.deleted.len()
    }

    /// Classes whose staged copy must go.
    fn removals(&self) -> impl Iterator<Item = &String> {
        self.changed.union(&self.deleted)
    }

    /// Classes whose live copy must be staged.
    fn updates(&self) -> impl Iterator<Item = &String> {
        self.changed.union(&self.added)
    }
}

/// `a.b.C` -> `a/b/C.java`
pub fn class_file(class: &str) -> PathBuf {
    PathBuf::from(format!("{}{SOURCE_SUFFIX}", class.replace('.', "/")))
}

/// What one [`ChangeApplier::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
    pub failed: usize,
}

impl SyncReport {
    /// Whether any staged file changed.
    pub fn dirty(&self) -> bool {
        !self.removed.is_empty() || !self.copied.is_empty()
    }
}

pub struct ChangeApplier<'a> {
    staging_root: &'a Path,
    live_source_root: &'a Path,
    source_roots: &'a SourceRoots,
}

impl<'a> ChangeApplier<'a> {
    pub fn new(
        staging_root: &'a Path,
        live_source_root: &'a Path,
        source_roots: &'a SourceRoots,
    ) -> Self {
        Self {
            staging_root,
            live_source_root,
            source_roots,
        }
    }

    /// Apply a change set. Per-file failures are logged and counted.
    pub fn apply(&self, changes: &ChangeSet) -> SyncReport {
        let mut report = SyncReport::default();
        self.remove_stale(changes, &mut report);
        self.copy_fresh(changes, &mut report);
        report
    }

    fn remove_stale(&self, changes: &ChangeSet, report: &mut SyncReport) {
        for class in changes.removals() {
            let target = self.staging_root.join(class_file(class));
            if !target.exists() {
                continue;
            }
            match fs::remove_file(&target) {
                Ok(()) => {
                    debug!("reload"; "removed {}", target.display());
                    report.removed.push(target);
                }
                Err(e) => {
                    log!("reload"; "could not remove changed file {}: {}", target.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    fn copy_fresh(&self, changes: &ChangeSet, report: &mut SyncReport) {
        for class in changes.updates() {
            let relative = class_file(class);
            let source = self.live_source_root.join(&relative);
            if !source.is_file() {
                continue;
            }
            if !self.is_tracked(&relative) {
                debug!("reload"; "{} is outside every module source root", class);
                continue;
            }

            let target = self.staging_root.join(&relative);
            match copy_file(&source, &target) {
                Ok(()) => {
                    debug!("reload"; "copied {} -> {}", source.display(), target.display());
                    report.copied.push(target);
                }
                Err(e) => {
                    log!(
                        "reload";
                        "could not copy changed file {} to {}: {}",
                        source.display(), target.display(), e
                    );
                    report.failed += 1;
                }
            }
        }
    }

    /// `relative` is relative to the live source root; each recorded root is
    /// compared relative to the staging root.
    fn is_tracked(&self, relative: &Path) -> bool {
        self.source_roots
            .iter()
            .any(|root| relative.starts_with(relativize(self.staging_root, root)))
    }
}

fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        staging: PathBuf,
        live: PathBuf,
        roots: SourceRoots,
    }

    /// Staging root with `com/app/client` recorded as a module source root.
    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("target/classes");
        let live = temp.path().join("src/main/java");
        fs::create_dir_all(staging.join("com/app/client")).unwrap();
        fs::create_dir_all(live.join("com/app/client")).unwrap();

        let mut roots = SourceRoots::new();
        roots.insert(staging.join("com/app/client"));

        Fixture {
            _temp: temp,
            staging,
            live,
            roots,
        }
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_class_file() {
        assert_eq!(class_file("com.app.client.A"), PathBuf::from("com/app/client/A.java"));
    }

    #[test]
    fn test_changed_added_deleted() {
        let f = fixture();
        let stage = |name: &str, body: &str| {
            fs::write(f.staging.join("com/app/client").join(name), body).unwrap();
        };
        let live = |name: &str, body: &str| {
            fs::write(f.live.join("com/app/client").join(name), body).unwrap();
        };

        stage("A.java", "class A { old }");
        stage("C.java", "class C {}");
        live("A.java", "class A { new }");
        live("B.java", "class B {}");

        let changes = ChangeSet {
            changed: names(&["com.app.client.A"]),
            added: names(&["com.app.client.B"]),
            deleted: names(&["com.app.client.C"]),
        };
        let report = ChangeApplier::new(&f.staging, &f.live, &f.roots).apply(&changes);

        let staged = f.staging.join("com/app/client");
        assert_eq!(fs::read_to_string(staged.join("A.java")).unwrap(), "class A { new }");
        assert_eq!(fs::read_to_string(staged.join("B.java")).unwrap(), "class B {}");
        assert!(!staged.join("C.java").exists());
        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.copied.len(), 2);
        assert_eq!(report.failed, 0);
        assert!(report.dirty());
    }

    #[test]
    fn test_outside_source_roots_not_dirty() {
        let f = fixture();
        fs::create_dir_all(f.live.join("com/app/server")).unwrap();
        fs::write(f.live.join("com/app/server/Service.java"), "class Service {}").unwrap();

        let changes = ChangeSet {
            changed: names(&["com.app.server.Service"]),
            added: names(&["com.other.Thing"]),
            deleted: BTreeSet::new(),
        };
        let report = ChangeApplier::new(&f.staging, &f.live, &f.roots).apply(&changes);

        assert!(!f.staging.join("com/app/server/Service.java").exists());
        assert_eq!(report, SyncReport::default());
        assert!(!report.dirty());
    }

    #[test]
    fn test_missing_live_file_only_removes() {
        let f = fixture();
        let staged = f.staging.join("com/app/client/Gone.java");
        fs::write(&staged, "class Gone {}").unwrap();

        let changes = ChangeSet {
            changed: names(&["com.app.client.Gone"]),
            ..Default::default()
        };
        let report = ChangeApplier::new(&f.staging, &f.live, &f.roots).apply(&changes);

        assert!(!staged.exists());
        assert_eq!(report.removed, vec![staged]);
        assert!(report.copied.is_empty());
        assert!(report.dirty());
    }

    #[test]
    fn test_root_beside_staging_never_matches() {
        // Roots outside the staging root relativize with `..` and cannot
        // prefix a path relative to the live source root.
        let f = fixture();
        let mut roots = SourceRoots::new();
        roots.insert(f.live.join("com/app/client"));
        fs::write(f.live.join("com/app/client/A.java"), "class A {}").unwrap();

        let changes = ChangeSet {
            added: names(&["com.app.client.A"]),
            ..Default::default()
        };
        let report = ChangeApplier::new(&f.staging, &f.live, &roots).apply(&changes);
        assert!(!report.dirty());
    }
}

//! Debounced file events to class-level change sets.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::stage::ChangeSet;

const SOURCE_EXTENSION: &str = "java";

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Build a change set from the source files under `live_root`.
///
/// Everything else (resources, files under additional roots) is ignored.
pub(super) fn change_set(events: &FxHashMap<PathBuf, ChangeKind>, live_root: &Path) -> ChangeSet {
    let mut changes = ChangeSet::default();
    for (path, kind) in events {
        let Some(class) = class_name(path, live_root) else {
            crate::debug!("watch"; "ignoring {} {}", kind.label(), path.display());
            continue;
        };
        let set = match kind {
            ChangeKind::Created => &mut changes.added,
            ChangeKind::Modified => &mut changes.changed,
            ChangeKind::Removed => &mut changes.deleted,
        };
        set.insert(class);
    }
    changes
}

/// `root/a/b/C.java` -> `a.b.C`
fn class_name(path: &Path, root: &Path) -> Option<String> {
    if path.extension()? != SOURCE_EXTENSION {
        return None;
    }
    let relative = path.strip_prefix(root).ok()?.with_extension("");

    let mut parts = Vec::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return None;
        };
        parts.push(part.to_str()?);
    }
    (!parts.is_empty()).then(|| parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        let root = Path::new("/p/src/main/java");
        assert_eq!(
            class_name(Path::new("/p/src/main/java/com/a/client/View.java"), root),
            Some("com.a.client.View".to_string())
        );
        assert_eq!(
            class_name(Path::new("/p/src/main/java/Top.java"), root),
            Some("Top".to_string())
        );
        assert_eq!(class_name(Path::new("/p/src/main/java/com/a/app.css"), root), None);
        assert_eq!(class_name(Path::new("/p/gen/com/a/Gen.java"), root), None);
    }

    #[test]
    fn test_change_set_by_kind() {
        let root = Path::new("/p/src/main/java");
        let mut events = FxHashMap::default();
        events.insert(root.join("com/a/A.java"), ChangeKind::Modified);
        events.insert(root.join("com/a/B.java"), ChangeKind::Created);
        events.insert(root.join("com/a/C.java"), ChangeKind::Removed);
        events.insert(root.join("com/a/style.css"), ChangeKind::Modified);
        events.insert(PathBuf::from("/elsewhere/D.java"), ChangeKind::Created);

        let changes = change_set(&events, root);
        assert_eq!(changes.len(), 3);
        assert!(changes.changed.contains("com.a.A"));
        assert!(changes.added.contains("com.a.B"));
        assert!(changes.deleted.contains("com.a.C"));
    }
}

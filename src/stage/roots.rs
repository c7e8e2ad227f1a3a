use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Append-only set of live source directories, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct SourceRoots {
    order: Vec<PathBuf>,
    seen: FxHashSet<PathBuf>,
}

impl SourceRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a root. Returns `false` if it was already known.
    pub fn insert(&mut self, root: PathBuf) -> bool {
        if self.seen.contains(&root) {
            return false;
        }
        self.seen.insert(root.clone());
        self.order.push(root);
        true
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.seen.contains(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

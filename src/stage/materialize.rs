//! Descriptor path elements to source roots or extracted subtrees.
//!
//! ```text
//! descriptor on disk:   /p/classes/com/app/App.gwt.xml + "client"
//!                       -> source root /p/classes/com/app/client (nothing copied)
//! descriptor in jar:    lib.jar!/com/lib/Lib.gwt.xml + "client"
//!                       -> copy Lib.gwt.xml, extract lib.jar!/com/lib/client/**
//! ```

use super::{
    SourceRoots,
    extract::{Extraction, extract_tree},
};
use crate::{
    debug,
    descriptor::LocatedDescriptor,
    resource::{ArchiveFs, ResourceError, ResourceLocator},
    utils::path::normalize_lexically,
};
use std::path::{Path, PathBuf};

pub struct PathMaterializer<'a> {
    staging_root: &'a Path,
    /// Reload passes only grow the source roots; archives are left alone.
    reload: bool,
    source_roots: &'a mut SourceRoots,
}

impl<'a> PathMaterializer<'a> {
    pub fn new(staging_root: &'a Path, reload: bool, source_roots: &'a mut SourceRoots) -> Self {
        Self {
            staging_root,
            reload,
            source_roots,
        }
    }

    /// Materialize every declared path of a descriptor, category by category.
    ///
    /// An archive-resident descriptor's archive is opened once for all of its
    /// path elements.
    pub fn materialize_all(
        &mut self,
        located: &LocatedDescriptor,
    ) -> Result<Extraction, ResourceError> {
        let mut opened = None;
        let mut report = Extraction::default();
        for (_, element) in located.descriptor.path_elements() {
            report.merge(self.materialize_with(
                &located.locator,
                Some(&element.path),
                &mut opened,
            )?);
        }
        Ok(report)
    }

    /// Materialize one path relative to the descriptor at `locator`.
    ///
    /// `None` is a no-op. An empty path means the descriptor's own directory.
    pub fn materialize(
        &mut self,
        locator: &ResourceLocator,
        path: Option<&str>,
    ) -> Result<Extraction, ResourceError> {
        self.materialize_with(locator, path, &mut None)
    }

    fn materialize_with(
        &mut self,
        locator: &ResourceLocator,
        path: Option<&str>,
        opened: &mut Option<ArchiveFs>,
    ) -> Result<Extraction, ResourceError> {
        let Some(path) = path else {
            return Ok(Extraction::default());
        };

        match locator {
            ResourceLocator::Filesystem(descriptor) => {
                let root = sibling_dir(descriptor, path);
                debug!("stage"; "source root {}", root.display());
                self.source_roots.insert(root);
                Ok(Extraction::default())
            }
            ResourceLocator::Archive { .. } if self.reload => Ok(Extraction::default()),
            ResourceLocator::Archive { archive, entry } => {
                if opened.is_none() {
                    *opened = Some(ArchiveFs::open(archive)?);
                }
                let Some(fs) = opened.as_mut() else {
                    return Ok(Extraction::default());
                };

                let descriptor_target = self.staging_root.join(entry.trim_start_matches('/'));
                fs.copy_to(entry, &descriptor_target)?;

                let subtree = sibling_entry(entry, path);
                if !fs.exists(&subtree) {
                    debug!("stage"; "{}!{} does not exist", archive.display(), subtree);
                    return Ok(Extraction::default());
                }
                Ok(extract_tree(fs, &subtree, self.staging_root))
            }
        }
    }
}

/// `path` resolved against the directory holding `descriptor`.
fn sibling_dir(descriptor: &Path, path: &str) -> PathBuf {
    let dir = descriptor.parent().unwrap_or(Path::new(""));
    normalize_lexically(&dir.join(path))
}

/// Archive-internal counterpart of [`sibling_dir`]. Always starts with `/`.
fn sibling_entry(entry: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        let dir = entry.rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{path}")
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ModuleDescriptor, PathElement};
    use crate::resource::archive::tests::write_zip;
    use std::fs;
    use tempfile::TempDir;

    fn lib_jar(temp: &TempDir) -> PathBuf {
        let jar = temp.path().join("lib.jar");
        write_zip(
            &jar,
            &[
                ("com/lib/Lib.gwt.xml", b"<module><source path=\"client\"/></module>"),
                ("com/lib/client/Widget.java", b"class Widget {}"),
                ("com/lib/client/Widget.class", b"\xca\xfe"),
                ("com/lib/client/ui/Panel.java", b"class Panel {}"),
                ("com/lib/public/lib.css", b"body {}"),
                ("com/lib/server/Service.java", b"class Service {}"),
            ],
        );
        jar
    }

    fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<(String, Vec<u8>)>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                    out.push((rel, fs::read(&path).unwrap()));
                }
            }
        }
        let mut out = Vec::new();
        walk(root, root, &mut out);
        out.sort();
        out
    }

    #[test]
    fn test_filesystem_empty_path_is_descriptor_dir() {
        let mut roots = SourceRoots::new();
        let staging = Path::new("/p/classes");
        let mut materializer = PathMaterializer::new(staging, false, &mut roots);

        let locator = ResourceLocator::Filesystem(PathBuf::from("/p/classes/com/app/App.gwt.xml"));
        materializer.materialize(&locator, Some("")).unwrap();
        materializer.materialize(&locator, Some("../shared")).unwrap();
        materializer.materialize(&locator, None).unwrap();

        let collected: Vec<_> = roots.iter().collect();
        assert_eq!(
            collected,
            vec![Path::new("/p/classes/com/app"), Path::new("/p/classes/com/shared")]
        );
    }

    #[test]
    fn test_archive_descriptor_extracts_subtree() {
        let temp = TempDir::new().unwrap();
        let jar = lib_jar(&temp);
        let staging = temp.path().join("classes");
        let mut roots = SourceRoots::new();

        let mut descriptor = ModuleDescriptor::new("com.lib.Lib");
        descriptor.sources.push(PathElement::new("client"));
        descriptor.public_resources.push(PathElement::new("public"));
        descriptor.super_sources.push(PathElement::new("missing"));
        let located = LocatedDescriptor {
            descriptor,
            locator: ResourceLocator::archive(&jar, "com/lib/Lib.gwt.xml"),
        };

        let report = PathMaterializer::new(&staging, false, &mut roots)
            .materialize_all(&located)
            .unwrap();

        assert_eq!(report.copied, 3);
        assert_eq!(report.skipped, 1);
        assert!(staging.join("com/lib/Lib.gwt.xml").is_file());
        assert!(staging.join("com/lib/client/Widget.java").is_file());
        assert!(staging.join("com/lib/client/ui/Panel.java").is_file());
        assert!(staging.join("com/lib/public/lib.css").is_file());
        assert!(!staging.join("com/lib/client/Widget.class").exists());
        assert!(!staging.join("com/lib/server").exists());
        assert!(roots.is_empty());
    }

    #[test]
    fn test_archive_materialize_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let jar = lib_jar(&temp);
        let staging = temp.path().join("classes");
        let mut roots = SourceRoots::new();
        let locator = ResourceLocator::archive(&jar, "com/lib/Lib.gwt.xml");

        PathMaterializer::new(&staging, false, &mut roots)
            .materialize(&locator, Some("client"))
            .unwrap();
        let first = snapshot(&staging);

        PathMaterializer::new(&staging, false, &mut roots)
            .materialize(&locator, Some("client"))
            .unwrap();
        assert_eq!(snapshot(&staging), first);
    }

    #[test]
    fn test_reload_skips_archives() {
        let temp = TempDir::new().unwrap();
        let jar = lib_jar(&temp);
        let staging = temp.path().join("classes");
        let mut roots = SourceRoots::new();

        let locator = ResourceLocator::archive(&jar, "com/lib/Lib.gwt.xml");
        let report = PathMaterializer::new(&staging, true, &mut roots)
            .materialize(&locator, Some("client"))
            .unwrap();

        assert_eq!(report, Extraction::default());
        assert!(!staging.exists());
    }

    #[test]
    fn test_sibling_entry() {
        assert_eq!(sibling_entry("/com/lib/Lib.gwt.xml", "client"), "/com/lib/client");
        assert_eq!(sibling_entry("/com/lib/Lib.gwt.xml", ""), "/com/lib");
        assert_eq!(sibling_entry("/com/lib/Lib.gwt.xml", "../other"), "/com/other");
        assert_eq!(sibling_entry("/com/lib/Lib.gwt.xml", "/abs/dir"), "/abs/dir");
        assert_eq!(sibling_entry("/Lib.gwt.xml", ""), "/");
    }
}

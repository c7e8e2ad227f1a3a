//! Archive extraction into the staging root.
//!
//! The backing compiler only reads plain files, so anything it needs from a
//! packaged archive is mirrored into the staging root first. Compiled
//! artifacts are never copied.

use crate::{
    debug, log,
    resource::{ArchiveFs, ResourceError, ResourceLocator},
};
use std::path::Path;

/// Suffix of compiled artifacts, skipped during extraction.
pub const COMPILED_SUFFIX: &str = ".class";

/// Counters for one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extraction {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Extraction {
    pub fn merge(&mut self, other: Self) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Copy every regular file at or below `entry` to its mirrored path under
/// `staging_root`, overwriting existing files.
///
/// Per-file failures are logged and counted; extraction continues.
pub fn extract_tree(archive: &mut ArchiveFs, entry: &str, staging_root: &Path) -> Extraction {
    let mut report = Extraction::default();

    for name in archive.walk(entry) {
        if name.ends_with(COMPILED_SUFFIX) {
            report.skipped += 1;
            continue;
        }

        let target = staging_root.join(&name);
        match archive.copy_to(&name, &target) {
            Ok(_) => report.copied += 1,
            Err(e) => {
                log!(
                    "stage";
                    "could not copy {}!/{} to {}: {}",
                    archive.path().display(), name, target.display(), e
                );
                report.failed += 1;
            }
        }
    }

    debug!(
        "stage";
        "{}!{}: {} copied, {} skipped, {} failed",
        archive.path().display(), entry, report.copied, report.skipped, report.failed
    );
    report
}

/// Make the archive that holds `locator` disk-resident under `staging_root`.
///
/// A filesystem locator is already readable and yields `None`. Otherwise the
/// whole containing archive is extracted.
pub fn extract_archive(
    locator: &ResourceLocator,
    staging_root: &Path,
) -> Result<Option<Extraction>, ResourceError> {
    let ResourceLocator::Archive { archive, .. } = locator else {
        debug!("stage"; "{} is already on disk", locator);
        return Ok(None);
    };

    let mut fs = ArchiveFs::open(archive)?;
    debug!("stage"; "extracting {} to {}", archive.display(), staging_root.display());
    Ok(Some(extract_tree(&mut fs, "/", staging_root)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::archive::tests::write_zip;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn bridge_jar(temp: &TempDir) -> PathBuf {
        let jar = temp.path().join("gwt-dev.jar");
        write_zip(
            &jar,
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
                ("com/google/gwt/core/client/", b""),
                ("com/google/gwt/core/client/GWTBridge.java", b"class GWTBridge {}"),
                ("com/google/gwt/core/client/GWTBridge.class", b"\xca\xfe\xba\xbe"),
            ],
        );
        jar
    }

    #[test]
    fn test_extract_archive_skips_compiled() {
        let temp = TempDir::new().unwrap();
        let jar = bridge_jar(&temp);
        let staging = temp.path().join("classes");

        let locator = ResourceLocator::archive(&jar, "com/google/gwt/core/client/GWTBridge.java");
        let report = extract_archive(&locator, &staging).unwrap().unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert!(staging.join("META-INF/MANIFEST.MF").is_file());
        assert_eq!(
            fs::read(staging.join("com/google/gwt/core/client/GWTBridge.java")).unwrap(),
            b"class GWTBridge {}"
        );
        assert!(!staging.join("com/google/gwt/core/client/GWTBridge.class").exists());
    }

    #[test]
    fn test_extract_archive_filesystem_noop() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("classes");
        let locator = ResourceLocator::Filesystem(temp.path().join("GWTBridge.java"));

        assert!(extract_archive(&locator, &staging).unwrap().is_none());
        assert!(!staging.exists());
    }

    #[test]
    fn test_extract_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let jar = bridge_jar(&temp);
        let staging = temp.path().join("classes");
        let target = staging.join("com/google/gwt/core/client/GWTBridge.java");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "stale").unwrap();

        let mut archive = ArchiveFs::open(&jar).unwrap();
        let report = extract_tree(&mut archive, "/com/google", &staging);

        assert_eq!(report.copied, 1);
        assert_eq!(fs::read(&target).unwrap(), b"class GWTBridge {}");
        assert!(!staging.join("META-INF").exists());
    }

    #[test]
    fn test_extract_archive_open_failure() {
        let temp = TempDir::new().unwrap();
        let locator = ResourceLocator::archive(temp.path().join("gone.jar"), "a/B.java");
        assert!(matches!(
            extract_archive(&locator, temp.path()),
            Err(ResourceError::OpenArchive(..))
        ));
    }
}

//! Browsable view over a packaged archive.
//!
//! Entry paths handed to this type use the locator convention (leading `/`);
//! zip-internal names carry no leading slash. Directory entries are optional
//! in zip files, so directory existence is answered by prefix.

use super::ResourceError;
use std::{
    fs::{self, File},
    io::{self, BufReader, Read},
    path::{Component, Path, PathBuf},
};
use zip::ZipArchive;

pub struct ArchiveFs {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
    /// Regular file entries, in archive order, without leading slash.
    files: Vec<String>,
}

impl ArchiveFs {
    /// Open an archive for browsing.
    pub fn open(path: &Path) -> Result<Self, ResourceError> {
        let file = File::open(path).map_err(|e| ResourceError::OpenArchive(path.to_path_buf(), e))?;
        let zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| ResourceError::Archive(path.to_path_buf(), e))?;

        let files = zip
            .file_names()
            .filter(|name| !name.ends_with('/') && is_enclosed(name))
            .map(str::to_owned)
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            files,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `entry` names a file or a directory inside the archive.
    pub fn exists(&self, entry: &str) -> bool {
        let key = entry_key(entry);
        if key.is_empty() {
            return true;
        }
        let dir = format!("{key}/");
        self.files
            .iter()
            .any(|name| name == key || name.starts_with(&dir))
            || self.zip.index_for_name(&dir).is_some()
    }

    /// Whether `entry` names a regular file.
    pub fn is_file(&self, entry: &str) -> bool {
        let key = entry_key(entry);
        self.files.iter().any(|name| name == key)
    }

    /// Every regular file at or below `entry`, without leading slash.
    pub fn walk(&self, entry: &str) -> Vec<String> {
        let key = entry_key(entry);
        if key.is_empty() {
            return self.files.clone();
        }
        let dir = format!("{key}/");
        self.files
            .iter()
            .filter(|name| *name == key || name.starts_with(&dir))
            .cloned()
            .collect()
    }

    /// Read a file entry into memory.
    pub fn read(&mut self, entry: &str) -> Result<Vec<u8>, ResourceError> {
        let index = self.index_of(entry)?;
        let mut file = self
            .zip
            .by_index(index)
            .map_err(|e| ResourceError::Archive(self.path.clone(), e))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| ResourceError::Io(self.path.join(entry_key(entry)), e))?;
        Ok(buf)
    }

    /// Copy a file entry to `target`, creating parents and overwriting.
    pub fn copy_to(&mut self, entry: &str, target: &Path) -> Result<u64, ResourceError> {
        let index = self.index_of(entry)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ResourceError::Io(parent.to_path_buf(), e))?;
        }
        let mut file = self
            .zip
            .by_index(index)
            .map_err(|e| ResourceError::Archive(self.path.clone(), e))?;
        let mut out =
            File::create(target).map_err(|e| ResourceError::Io(target.to_path_buf(), e))?;
        io::copy(&mut file, &mut out).map_err(|e| ResourceError::Io(target.to_path_buf(), e))
    }

    fn index_of(&self, entry: &str) -> Result<usize, ResourceError> {
        let key = entry_key(entry);
        self.zip
            .index_for_name(key)
            .ok_or_else(|| ResourceError::MissingEntry {
                archive: self.path.clone(),
                entry: format!("/{key}"),
            })
    }
}

/// Strip the locator's leading slash and any trailing slash.
fn entry_key(entry: &str) -> &str {
    entry.trim_start_matches('/').trim_end_matches('/')
}

/// Reject names that would escape the extraction root.
fn is_enclosed(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

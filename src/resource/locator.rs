//! Resource locator wire form.
//!
//! A located resource is either a plain file on disk or an entry inside an
//! archive. The wire form mirrors JVM resource URLs:
//!
//! ```text
//! file:///p/target/classes/com/example/App.gwt.xml      -> Filesystem
//! /p/target/classes/com/example/App.gwt.xml             -> Filesystem
//! jar:file:///p/lib/gwt-user.jar!/com/google/gwt/User.gwt.xml -> Archive
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Separator between the archive locator and the internal entry path.
const ENTRY_SEPARATOR: char = '!';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("archive locator `{0}` has no `!` separator")]
    MissingSeparator(String),

    #[error("archive locator `{0}` has an empty entry path")]
    EmptyEntry(String),

    #[error("`{0}` is not a valid file URL")]
    InvalidFileUrl(String),

    #[error("unsupported locator scheme in `{0}`")]
    UnsupportedScheme(String),
}

/// Where a resource lives. Never both a path and an archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceLocator {
    /// A regular file on disk.
    Filesystem(PathBuf),
    /// An entry inside an archive. `entry` always starts with `/`.
    Archive { archive: PathBuf, entry: String },
}

impl ResourceLocator {
    /// Build an archive locator, normalizing the entry to a leading `/`.
    pub fn archive(archive: impl Into<PathBuf>, entry: &str) -> Self {
        let entry = format!("/{}", entry.trim_start_matches('/'));
        Self::Archive {
            archive: archive.into(),
            entry,
        }
    }

    /// Parse the wire form.
    pub fn parse(uri: &str) -> Result<Self, LocatorError> {
        if let Some(rest) = uri.strip_prefix("jar:") {
            let (archive, entry) = rest
                .split_once(ENTRY_SEPARATOR)
                .ok_or_else(|| LocatorError::MissingSeparator(uri.to_string()))?;
            if entry.trim_matches('/').is_empty() {
                return Err(LocatorError::EmptyEntry(uri.to_string()));
            }
            let archive = file_url_to_path(archive)?;
            return Ok(Self::archive(archive, entry));
        }

        if uri.starts_with("file:") {
            return file_url_to_path(uri).map(Self::Filesystem);
        }

        // Reject other URL schemes; single letters are Windows drive prefixes
        if let Ok(url) = Url::parse(uri)
            && url.scheme().len() > 1
        {
            return Err(LocatorError::UnsupportedScheme(uri.to_string()));
        }

        Ok(Self::Filesystem(PathBuf::from(uri)))
    }

    /// Whether `raw` is written in wire form rather than as a resource name.
    pub fn is_wire_form(raw: &str) -> bool {
        raw.starts_with("jar:") || raw.starts_with("file:")
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem(path) => write!(f, "{}", path_to_url(path)),
            Self::Archive { archive, entry } => {
                write!(f, "jar:{}{ENTRY_SEPARATOR}{entry}", path_to_url(archive))
            }
        }
    }
}

fn file_url_to_path(raw: &str) -> Result<PathBuf, LocatorError> {
    Url::parse(raw)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| LocatorError::InvalidFileUrl(raw.to_string()))
}

fn path_to_url(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| path.display().to_string())
}

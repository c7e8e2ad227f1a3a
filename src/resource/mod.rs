//! Resource location across plain directories and packaged archives.
//!
//! # Module Structure
//!
//! ```text
//! resource/
//! ├── locator     # ResourceLocator: Filesystem | Archive { archive, entry }
//! ├── archive     # ArchiveFs: browsable view over a zip/jar
//! └── classpath   # ClassPath: ordered lookup over dirs and archives
//! ```

pub(crate) mod archive;
mod classpath;
mod locator;

pub use archive::ArchiveFs;
pub use classpath::{ClassPath, ClassPathEntry};
pub use locator::{LocatorError, ResourceLocator};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or reading resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error("cannot open archive `{0}`")]
    OpenArchive(PathBuf, #[source] std::io::Error),

    #[error("cannot read archive `{0}`")]
    Archive(PathBuf, #[source] zip::result::ZipError),

    #[error("entry `{entry}` not found in `{archive}`")]
    MissingEntry { archive: PathBuf, entry: String },

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

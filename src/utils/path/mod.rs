//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `normalize_lexically`, `relativize`)

pub mod fs;

pub use fs::{normalize_lexically, normalize_path, relativize};

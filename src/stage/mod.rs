//! Module staging engine.
//!
//! # Module Structure
//!
//! ```text
//! stage/
//! ├── extract       # Archive -> staging root copies
//! ├── materialize   # Descriptor path elements -> source roots / extractions
//! ├── roots         # Ordered source root set
//! ├── sync          # Incremental change applier
//! └── session       # Bootstrap/reload state machine
//! ```

mod extract;
mod materialize;
mod roots;
mod session;
mod sync;

pub use extract::{Extraction, extract_archive};
pub use materialize::PathMaterializer;
pub use roots::SourceRoots;
pub use session::{Session, SessionState};
pub use sync::{ChangeApplier, ChangeSet, SyncReport};

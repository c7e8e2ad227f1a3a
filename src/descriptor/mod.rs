//! Module descriptors: parsed shape, XML parsing, and transitive resolution.

mod model;
mod parse;
mod resolve;

pub use model::{ModuleDescriptor, PathCategory, PathElement};
pub use parse::{DescriptorError, parse_descriptor};
pub use resolve::{ClassPathDescriptors, DescriptorSource, Expansion, LocatedDescriptor, expand};

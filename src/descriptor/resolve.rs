//! Transitive module expansion over `inherits` edges.
//!
//! Breadth-first over the inheritance graph with an explicit queue and a
//! guard set: every reachable module is visited exactly once, in first-seen
//! order, regardless of cycles or diamonds.

use super::{ModuleDescriptor, parse_descriptor};
use crate::{
    debug, log,
    resource::{ClassPath, ResourceLocator},
};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// A parsed descriptor together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDescriptor {
    pub descriptor: ModuleDescriptor,
    pub locator: ResourceLocator,
}

/// Loads descriptors by module name. `Ok(None)` means "not found".
pub trait DescriptorSource {
    fn load(&self, module: &str) -> Result<Option<LocatedDescriptor>>;
}

/// Descriptors looked up on a [`ClassPath`].
pub struct ClassPathDescriptors<'a> {
    classpath: &'a ClassPath,
    suffix: &'a str,
}

impl<'a> ClassPathDescriptors<'a> {
    pub fn new(classpath: &'a ClassPath, suffix: &'a str) -> Self {
        Self { classpath, suffix }
    }
}

impl DescriptorSource for ClassPathDescriptors<'_> {
    fn load(&self, module: &str) -> Result<Option<LocatedDescriptor>> {
        let resource = ModuleDescriptor::resource_name(module, self.suffix);
        let Some(locator) = self.classpath.locate(&resource)? else {
            log!("module"; "could not find '{}' for module '{}'", resource, module);
            return Ok(None);
        };

        let xml = ClassPath::read(&locator)
            .with_context(|| format!("reading descriptor {locator}"))?;
        let descriptor = parse_descriptor(module, &xml)?;
        debug!("module"; "loaded {}", locator);

        Ok(Some(LocatedDescriptor {
            descriptor,
            locator,
        }))
    }
}

/// Result of one expansion pass.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Resolved modules in first-seen order.
    pub modules: Vec<LocatedDescriptor>,
    /// Modules whose descriptor could not be located.
    pub missing: Vec<String>,
    /// Guard set: every module name ever queued.
    pub guard: FxHashSet<String>,
}

impl Expansion {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.descriptor.name.as_str())
    }
}

/// Expand `seeds` transitively, calling `visit` once per resolved module.
///
/// Missing descriptors are logged and skipped; errors from `source` or
/// `visit` abort the expansion.
pub fn expand<S, F>(seeds: &[String], source: &S, mut visit: F) -> Result<Expansion>
where
    S: DescriptorSource + ?Sized,
    F: FnMut(&LocatedDescriptor) -> Result<()>,
{
    let mut expansion = Expansion::default();
    let mut queue = VecDeque::new();

    for seed in seeds {
        if expansion.guard.insert(seed.clone()) {
            queue.push_back(seed.clone());
        }
    }

    while let Some(module) = queue.pop_front() {
        let Some(located) = source.load(&module)? else {
            expansion.missing.push(module);
            continue;
        };

        for inherited in &located.descriptor.inherits {
            if expansion.guard.insert(inherited.clone()) {
                queue.push_back(inherited.clone());
            }
        }

        visit(&located)?;
        expansion.modules.push(located);
    }

    Ok(expansion)
}

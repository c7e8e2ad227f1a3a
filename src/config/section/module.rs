//! `[module]` section configuration.
//!
//! Which modules to stage and where their files live.
//!
//! # Example
//!
//! ```toml
//! [module]
//! names = ["com.example.App"]          # Seed modules, inherits are followed
//! source_root = "src/main/java"         # Live sources watched for changes
//! additional_source_roots = ["../shared/src/main/java"]
//! classes_dir = "target/classes"        # Staging root seen by the compiler
//! temp_dir = "target/stagehand"         # Scratch; `work/` is created inside
//! classpath = ["target/classes", "lib/*"]
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Module staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Seed module names (`a.b.App`).
    pub names: Vec<String>,

    /// Authoritative live source root.
    pub source_root: PathBuf,

    /// Extra live roots handed to the backing compiler.
    pub additional_source_roots: Vec<PathBuf>,

    /// Staging root.
    pub classes_dir: PathBuf,

    /// Session scratch directory.
    pub temp_dir: PathBuf,

    /// Ordered resource search path. `dir/*` expands to every archive in `dir`.
    pub classpath: Vec<PathBuf>,

    /// Descriptor file suffix.
    pub descriptor_suffix: String,

    /// Resource whose archive is extracted on a fresh session.
    ///
    /// A classpath name, or a locator such as `jar:file:///p/lib/gwt-dev.jar!/com/…`.
    pub support_resource: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            source_root: "src/main/java".into(),
            additional_source_roots: Vec::new(),
            classes_dir: "target/classes".into(),
            temp_dir: "target/stagehand".into(),
            classpath: vec!["target/classes".into()],
            descriptor_suffix: ".gwt.xml".into(),
            support_resource: "com/google/gwt/core/client/GWTBridge.java".into(),
        }
    }
}

impl ModuleConfig {
    /// Work directory for the backing compiler.
    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.join("work")
    }

    /// Additional source roots that exist on disk.
    pub fn existing_additional_roots(&self) -> impl Iterator<Item = &PathBuf> {
        self.additional_source_roots
            .iter()
            .filter(|p| !p.as_os_str().is_empty() && p.exists())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(blank) = self.names.iter().find(|n| n.trim().is_empty()) {
            diag.error("module.names", format!("invalid module name `{blank}`"));
        }
        if self.descriptor_suffix.is_empty() {
            diag.error_with_hint(
                "module.descriptor_suffix",
                "must not be empty",
                "the default is \".gwt.xml\"",
            );
        }
        if self.support_resource.trim_start_matches('/').is_empty() {
            diag.error("module.support_resource", "must name a resource");
        }
    }
}

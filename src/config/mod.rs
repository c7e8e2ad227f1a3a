//! Project configuration management for `stagehand.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── module     # [module]
//! │   ├── backend    # [backend]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── handle     # Global config handle
//! └── mod.rs         # StageConfig (this file)
//! ```

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_path};

pub use section::{BackendConfig, ModuleConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing stagehand.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Modules to stage and their roots
    #[serde(default)]
    pub module: ModuleConfig,

    /// Backing compiler/dev server
    #[serde(default)]
    pub backend: BackendConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl StageConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = crate::utils::path::normalize_path(&config_path);
        config.finalize();
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Resolve root and normalize every configured path against it.
    fn finalize(&mut self) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = crate::utils::path::normalize_path(&root);
        self.normalize_paths();
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Stage => {}
            Commands::Serve {
                interface,
                port,
                watch,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self) {
        let root = self.root.clone();
        let module = &mut self.module;

        module.source_root = resolve_path(&module.source_root, &root);
        module.classes_dir = resolve_path(&module.classes_dir, &root);
        module.temp_dir = resolve_path(&module.temp_dir, &root);
        module.additional_source_roots = module
            .additional_source_roots
            .iter()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| resolve_path(p, &root))
            .collect();
        module.classpath = module
            .classpath
            .iter()
            .map(|p| resolve_path(p, &root))
            .collect();

        self.serve.root = resolve_path(&self.serve.root, &root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.module.validate(&mut diag);
        self.backend.validate(&mut diag);
        diag.into_result()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> StageConfig {
    let (parsed, ignored) = StageConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

//! One staging session: bootstrap once, then reload on every change set.
//!
//! ```text
//! Uninitialized ──bootstrap──► Bootstrapping ──► Running
//!                                                  │  ▲
//!                                        reload    ▼  │ clean
//!                                          ApplyingChanges
//!                                                  │ dirty
//!                                                  ▼
//!                                             Refreshing ──► Running
//! ```

use super::{
    ChangeApplier, ChangeSet, Extraction, PathMaterializer, SourceRoots, SyncReport,
    extract_archive,
};
use crate::{
    backend::{Backend, Launch},
    config::StageConfig,
    debug,
    descriptor::{ClassPathDescriptors, expand},
    log,
    resource::ClassPath,
};
use anyhow::{Context, Result, ensure};
use std::{
    fmt, fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Bootstrapping,
    Running,
    ApplyingChanges,
    Refreshing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Bootstrapping => "bootstrapping",
            Self::Running => "running",
            Self::ApplyingChanges => "applying changes",
            Self::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}

pub struct Session<B: Backend> {
    config: Arc<StageConfig>,
    backend: B,
    classpath: ClassPath,
    source_roots: SourceRoots,
    state: SessionState,
    /// Set once the backend is up; read by request threads.
    backend_live: Arc<AtomicBool>,
}

impl<B: Backend> Session<B> {
    pub fn new(config: Arc<StageConfig>, backend: B) -> Self {
        let classpath = ClassPath::from_paths(&config.module.classpath);
        Self {
            config,
            backend,
            classpath,
            source_roots: SourceRoots::new(),
            state: SessionState::Uninitialized,
            backend_live: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Seed modules, as configured.
    pub fn modules(&self) -> &[String] {
        &self.config.module.names
    }

    pub fn source_roots(&self) -> &SourceRoots {
        &self.source_roots
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared flag, true once a bootstrap has started the backend.
    ///
    /// Stays valid after the session moves to another thread.
    pub fn backend_live(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.backend_live)
    }

    /// Stage every module and start the backend.
    ///
    /// Returns `Ok(false)` when a precondition skips the session; the session
    /// stays uninitialized and may be bootstrapped again. Errors are fatal.
    pub fn bootstrap(&mut self) -> Result<bool> {
        ensure!(
            self.state == SessionState::Uninitialized,
            "cannot bootstrap a session that is {}",
            self.state
        );

        if !self.check_preconditions()? {
            return Ok(false);
        }

        self.state = SessionState::Bootstrapping;
        let staged = match self.stage() {
            Ok(staged) => staged,
            Err(e) => {
                self.state = SessionState::Uninitialized;
                return Err(e);
            }
        };
        let Some(extraction) = staged else {
            self.state = SessionState::Uninitialized;
            return Ok(false);
        };

        log!(
            "stage";
            "staged {} files into {} ({} source roots)",
            extraction.copied,
            self.config.module.classes_dir.display(),
            self.source_roots.len()
        );

        if !self.backend.is_running() {
            let launch = self.launch();
            if let Err(e) = self.backend.start(&launch) {
                log!("error"; "failed to start backing server: {:#}", e);
                self.state = SessionState::Uninitialized;
                return Ok(false);
            }
        }

        self.state = SessionState::Running;
        self.backend_live.store(true, Ordering::Release);
        Ok(true)
    }

    /// Apply one change set to a running session.
    ///
    /// Refresh failures are logged; the previous compile output stays servable.
    pub fn reload(&mut self, changes: &ChangeSet) -> Result<SyncReport> {
        ensure!(
            self.state == SessionState::Running,
            "cannot reload a session that is {}",
            self.state
        );

        self.state = SessionState::ApplyingChanges;
        if let Err(e) = self.resolve(true) {
            self.state = SessionState::Running;
            return Err(e);
        }

        let module = &self.config.module;
        let report =
            ChangeApplier::new(&module.classes_dir, &module.source_root, &self.source_roots)
                .apply(changes);
        debug!(
            "reload";
            "{} removed, {} copied, {} failed",
            report.removed.len(), report.copied.len(), report.failed
        );

        if report.dirty() {
            self.state = SessionState::Refreshing;
            if let Err(e) = self.backend.refresh() {
                log!("error"; "recompile failed: {:#}", e);
            }
        }

        self.state = SessionState::Running;
        Ok(report)
    }

    /// Checks run before anything is written. `Ok(false)` skips the session.
    fn check_preconditions(&self) -> Result<bool> {
        let module = &self.config.module;

        if module.names.is_empty() {
            log!("warning"; "no modules configured, nothing to stage");
            return Ok(false);
        }
        if !module.source_root.is_dir() {
            log!("error"; "source root {} is not a directory", module.source_root.display());
            return Ok(false);
        }
        if !module.classes_dir.exists() {
            log!("error"; "staging root {} does not exist", module.classes_dir.display());
            return Ok(false);
        }
        if !module.classes_dir.is_dir() {
            log!("error"; "staging root {} is not a directory", module.classes_dir.display());
            return Ok(false);
        }

        if !module.temp_dir.exists()
            && let Err(e) = fs::create_dir_all(&module.temp_dir)
        {
            log!("error"; "could not create {}: {}", module.temp_dir.display(), e);
            return Ok(false);
        }
        ensure!(
            module.temp_dir.is_dir(),
            "{} exists but is not a directory",
            module.temp_dir.display()
        );

        let work_dir = module.work_dir();
        fs::create_dir_all(&work_dir)
            .with_context(|| format!("failed to create {}", work_dir.display()))?;

        Ok(true)
    }

    /// Extract support sources and materialize every module.
    ///
    /// `None` when the support resource is missing.
    fn stage(&mut self) -> Result<Option<Extraction>> {
        let module = &self.config.module;

        let Some(support) = self.classpath.locate(&module.support_resource)? else {
            log!("error"; "could not find {} on the classpath", module.support_resource);
            return Ok(None);
        };
        let mut extraction = extract_archive(&support, &module.classes_dir)
            .with_context(|| format!("failed to extract {support}"))?
            .unwrap_or_default();

        extraction.merge(self.resolve(false)?);
        Ok(Some(extraction))
    }

    /// Expand the seed modules and materialize their paths.
    fn resolve(&mut self, reload: bool) -> Result<Extraction> {
        let module = &self.config.module;
        let source = ClassPathDescriptors::new(&self.classpath, &module.descriptor_suffix);
        let mut materializer =
            PathMaterializer::new(&module.classes_dir, reload, &mut self.source_roots);

        let mut extraction = Extraction::default();
        let expansion = expand(&module.names, &source, |located| {
            let report = materializer
                .materialize_all(located)
                .with_context(|| format!("failed to stage module {}", located.descriptor.name))?;
            extraction.merge(report);
            Ok(())
        })?;

        debug!(
            "module";
            "resolved {} modules ({} missing)",
            expansion.modules.len(), expansion.missing.len()
        );
        Ok(extraction)
    }

    fn launch(&self) -> Launch {
        let module = &self.config.module;
        let mut source_roots: Vec<PathBuf> = vec![module.source_root.clone()];
        source_roots.extend(module.existing_additional_roots().cloned());
        source_roots.push(module.classes_dir.clone());

        Launch {
            work_dir: module.work_dir(),
            staging_root: module.classes_dir.clone(),
            source_roots,
            modules: module.names.clone(),
            bind_address: self.config.backend.bind_address.clone(),
            port: self.config.backend.port,
        }
    }
}

//! Backing compiler/dev server.
//!
//! A session owns exactly one [`Backend`]. It is started once, after the
//! first successful staging, and asked to refresh whenever a reload changes
//! staged files.

mod args;
mod codeserver;

pub use codeserver::CodeServer;

use anyhow::Result;
use std::{path::PathBuf, time::Duration};

/// Wildcard bind address, reached through loopback from the same host.
const WILDCARD_ADDRESS: &str = "0.0.0.0";
const LOOPBACK_ADDRESS: &str = "127.0.0.1";

/// Everything a backend needs to start compiling the staged modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub work_dir: PathBuf,
    pub staging_root: PathBuf,
    /// Live source roots: main, additional, then the staging root.
    pub source_roots: Vec<PathBuf>,
    /// Seed modules, as configured.
    pub modules: Vec<String>,
    pub bind_address: String,
    pub port: u16,
}

pub trait Backend {
    fn is_running(&self) -> bool;

    /// Start the backend. Called at most once per successful bootstrap.
    fn start(&mut self, launch: &Launch) -> Result<()>;

    /// Ask the backend to recompile. Blocks until it answers.
    fn refresh(&mut self) -> Result<()>;
}

/// Backend for one-shot staging: nothing is launched or refreshed.
#[derive(Debug, Default)]
pub struct Detached {
    running: bool,
}

impl Backend for Detached {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, _launch: &Launch) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Map the wildcard bind address to loopback.
pub fn loopback_if_wildcard(address: &str) -> &str {
    if address == WILDCARD_ADDRESS {
        LOOPBACK_ADDRESS
    } else {
        address
    }
}

/// Pooled agent for requests to the backing server.
///
/// Redirects are not followed so the caller sees the backend's own answer.
pub fn http_agent(timeout: Duration, max_idle_connections: usize) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .max_idle_connections(max_idle_connections)
        .max_idle_connections_per_host(max_idle_connections)
        .redirects(0)
        .build()
}

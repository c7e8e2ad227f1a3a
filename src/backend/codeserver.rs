//! Backing server launched as a child process and refreshed over HTTP.

use super::{Backend, Launch, args, http_agent, loopback_if_wildcard};
use crate::{config::BackendConfig, debug, log};
use anyhow::{Context, Result, bail};
use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

pub struct CodeServer {
    command: Vec<String>,
    refresh_path: String,
    cwd: PathBuf,
    agent: ureq::Agent,
    child: Option<Child>,
    /// `host:port` the backend answers on, known once started.
    authority: Option<String>,
    modules: Vec<String>,
    running: bool,
}

impl CodeServer {
    /// `cwd` is the project root; the command runs there.
    pub fn new(config: &BackendConfig, cwd: &Path) -> Self {
        Self {
            command: config.command.clone(),
            refresh_path: config.refresh_path.trim_end_matches('/').to_string(),
            cwd: cwd.to_path_buf(),
            agent: http_agent(config.timeout(), config.max_idle_connections),
            child: None,
            authority: None,
            modules: Vec::new(),
            running: false,
        }
    }

    fn spawn(&self, launch: &Launch) -> Result<Child> {
        let vars = args::launch_vars(launch);
        let argv = args::resolve_args(&self.command, &vars, launch);
        let (program, rest) = argv.split_first().context("backend command is empty")?;

        debug!("backend"; "args: {}", argv.join(" "));
        let child = Command::new(program)
            .args(rest)
            .current_dir(&self.cwd)
            .envs(&vars)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch `{program}`"))?;

        log!("backend"; "launched `{}` (pid {})", program, child.id());
        Ok(child)
    }

    /// Fail if the child process has exited since it was launched.
    fn check_alive(&mut self) -> Result<()> {
        let exited = match self.child.as_mut() {
            Some(child) => child.try_wait().context("failed to poll backing server")?,
            None => None,
        };
        if let Some(status) = exited {
            self.child = None;
            self.running = false;
            bail!("backing server exited ({status})");
        }
        Ok(())
    }
}

impl Backend for CodeServer {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, launch: &Launch) -> Result<()> {
        if self.running {
            return Ok(());
        }

        if self.command.is_empty() {
            log!("backend"; "no command configured, expecting a server on {}:{}", launch.bind_address, launch.port);
        } else {
            self.child = Some(self.spawn(launch)?);
        }

        self.authority = Some(format!(
            "{}:{}",
            loopback_if_wildcard(&launch.bind_address),
            launch.port
        ));
        self.modules = launch.modules.clone();
        self.running = true;
        log!("backend"; "selected modules: {}", self.modules.join(", "));
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.check_alive()?;
        let Some(authority) = &self.authority else {
            bail!("backing server was never started");
        };

        for module in &self.modules {
            let url = format!("http://{authority}{}/{module}", self.refresh_path);
            debug!("backend"; "GET {}", url);
            self.agent
                .get(&url)
                .call()
                .with_context(|| format!("recompile of {module} failed"))?;
        }
        Ok(())
    }
}

impl Drop for CodeServer {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("backend"; "stopping pid {}", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

//! `[backend]` section configuration.
//!
//! The backing compiler/dev server that staged files are compiled by and
//! asset requests are proxied to.
//!
//! # Example
//!
//! ```toml
//! [backend]
//! bind_address = "127.0.0.1"
//! port = 9876
//! command = [
//!     "java", "-cp", "lib/*", "com.google.gwt.dev.codeserver.CodeServer",
//!     "-workDir", "$STAGEHAND_WORK_DIR",
//!     "-bindAddress", "$STAGEHAND_BIND_ADDRESS", "-port", "$STAGEHAND_PORT",
//!     "-src=$STAGEHAND_SOURCE_ROOTS",
//!     "$STAGEHAND_MODULES",
//! ]
//! refresh_path = "/recompile"
//! timeout_ms = 30000
//! ```
//!
//! `-src=$STAGEHAND_SOURCE_ROOTS` passes `-src <dir>` for the main source
//! root, each existing additional root and the staging root, in that order.
//! Leave `command` empty when the backing server is started by other means.

use crate::{config::ConfigDiagnostics, debug, proxy::DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port as an integer or numeric string; anything else keeps the default.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    let port = match &value {
        toml::Value::Integer(port) => u16::try_from(*port).ok(),
        toml::Value::String(port) => port.trim().parse().ok(),
        _ => None,
    };
    Ok(port.unwrap_or_else(|| {
        debug!("config"; "backend.port {} is not a port, using {}", value, DEFAULT_PORT);
        DEFAULT_PORT
    }))
}

/// Backing server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Address the backing server binds to. `0.0.0.0` is reached via loopback.
    pub bind_address: String,

    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    /// Program and arguments. `$STAGEHAND_*` variables are substituted.
    pub command: Vec<String>,

    /// Path prefix of the per-module recompile endpoint.
    pub refresh_path: String,

    /// Outbound request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Idle pooled connections kept to the backing server.
    pub max_idle_connections: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            command: Vec::new(),
            refresh_path: "/recompile".into(),
            timeout_ms: 30_000,
            max_idle_connections: 8,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.bind_address.trim().is_empty() {
            diag.error("backend.bind_address", "must not be empty");
        }
        if !self.refresh_path.starts_with('/') {
            diag.error_with_hint(
                "backend.refresh_path",
                "must start with `/`",
                format!("use \"/{}\"", self.refresh_path),
            );
        }
        if self.timeout_ms == 0 {
            diag.error("backend.timeout_ms", "must be greater than zero");
        }
        if self.command.first().is_some_and(|program| program.trim().is_empty()) {
            diag.error("backend.command", "program name is empty");
        }
    }
}

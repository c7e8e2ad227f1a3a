//! Shutdown state for serve mode.
//!
//! `SHUTDOWN` is set once Ctrl+C is received. A registered server is then
//! unblocked and the watcher is told to stop. With nothing registered the
//! process exits immediately, unless exit was deferred: a caller that owns a
//! backing server child polls [`is_shutdown`] and unwinds so the child is
//! dropped (and killed) first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Ctrl+C must not exit the process directly
static EXIT_DEFERRED: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the watcher thread
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else if exits_on_signal() {
            std::process::exit(0);
        } else {
            crate::log!("serve"; "shutting down after staging...");
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Keep the process alive on Ctrl+C until the caller unwinds on its own
pub fn defer_exit() {
    EXIT_DEFERRED.store(true, Ordering::SeqCst);
}

/// Whether Ctrl+C would exit the process on the spot
fn exits_on_signal() -> bool {
    SERVER.get().is_none() && !EXIT_DEFERRED.load(Ordering::SeqCst)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

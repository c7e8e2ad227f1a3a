//! Reload watcher.
//!
//! Watches the live source roots and feeds debounced changes to the session
//! on a dedicated thread.
//!
//! ```text
//! notify → Debouncer (timing, dedup) → change_set (.java under source root)
//!        → Session::bootstrap (not running yet) | Session::reload
//! ```

mod changes;
mod debouncer;
mod watch_roots;

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{Receiver, unbounded};
use notify::RecommendedWatcher;
use rustc_hash::FxHashMap;

use crate::backend::Backend;
use crate::config::StageConfig;
use crate::logger::{status_error, status_success, status_unchanged};
use crate::stage::Session;
use changes::{ChangeKind, change_set};
use debouncer::Debouncer;
use watch_roots::WatchRoots;

pub struct ReloadWatcher {
    notify_rx: Receiver<notify::Result<notify::Event>>,
    watcher: RecommendedWatcher,
    roots: WatchRoots,
    debouncer: Debouncer,
    live_root: PathBuf,
}

impl ReloadWatcher {
    /// Start watching immediately; events buffer until [`ReloadWatcher::spawn`].
    pub fn new(config: &StageConfig) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = notify_tx.send(res);
        })?;

        let mut paths = vec![config.module.source_root.clone()];
        paths.extend(config.module.additional_source_roots.iter().cloned());
        let mut roots = WatchRoots::new(paths);
        roots.attach_existing(&mut watcher)?;
        crate::debug!("watch"; "watching {} source roots", roots.attached());

        Ok(Self {
            notify_rx,
            watcher,
            roots,
            debouncer: Debouncer::new(),
            live_root: config.module.source_root.clone(),
        })
    }

    /// Run the watch loop on its own thread until `shutdown_rx` fires.
    pub fn spawn<B>(
        self,
        session: Session<B>,
        shutdown_rx: Receiver<()>,
    ) -> std::io::Result<JoinHandle<()>>
    where
        B: Backend + Send + 'static,
    {
        thread::Builder::new()
            .name("watch".into())
            .spawn(move || self.run(session, shutdown_rx))
    }

    fn run<B: Backend>(self, mut session: Session<B>, shutdown_rx: Receiver<()>) {
        let Self {
            notify_rx,
            mut watcher,
            mut roots,
            mut debouncer,
            live_root,
        } = self;

        loop {
            let timeout = debouncer.sleep_duration();
            crossbeam::select! {
                recv(shutdown_rx) -> _ => break,
                recv(notify_rx) -> msg => match msg {
                    Ok(Ok(event)) => debouncer.add_event(&event),
                    Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                    Err(_) => break,
                },
                default(timeout) => {
                    roots.maintain(&mut watcher);
                    if let Some(events) = debouncer.take_if_ready() {
                        process(&mut session, &events, &live_root);
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Bootstrap a session that never came up, otherwise reload it.
fn process<B: Backend>(
    session: &mut Session<B>,
    events: &FxHashMap<PathBuf, ChangeKind>,
    live_root: &Path,
) {
    if !session.is_running() {
        crate::debug!("watch"; "{} changes, retrying bootstrap", events.len());
        match session.bootstrap() {
            Ok(true) => status_success("staged modules, backing server started"),
            Ok(false) => status_unchanged("session not started, waiting for changes"),
            Err(e) => status_error("bootstrap failed", &format!("{e:#}")),
        }
        return;
    }

    let changes = change_set(events, live_root);
    if changes.is_empty() {
        return;
    }

    match session.reload(&changes) {
        Ok(report) if report.dirty() => status_success(&format!(
            "synced {} classes ({} copied, {} removed), recompiled",
            changes.len(),
            report.copied.len(),
            report.removed.len()
        )),
        Ok(_) => status_unchanged(&format!("{} changes outside module sources", changes.len())),
        Err(e) => status_error("reload failed", &format!("{e:#}")),
    }
}

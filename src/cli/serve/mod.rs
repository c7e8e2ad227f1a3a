//! Development server fronting the backing server.
//!
//! ```text
//! request ──► ProxyFilter ──► Proxied: relay backing response
//!                 │
//!                 └─ Continue ──► static file under [serve].root ──► 404
//! ```

mod lifecycle;
mod path;
mod response;

use crate::{
    backend::CodeServer,
    config::{StageConfig, cfg},
    core,
    debug, log,
    proxy::{InitParams, Outcome, ProxyFilter},
    stage::Session,
    watch::ReloadWatcher,
};
use anyhow::Result;
use crossbeam::channel;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(config: &StageConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        shutdown_rx,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Bootstrap, launch the backend, then serve until Ctrl+C.
pub fn serve() -> Result<()> {
    let config = cfg();
    // From here on a backing server child may exist; unwind instead of exiting.
    core::defer_exit();

    // Watch before staging so edits made during bootstrap are not lost.
    let watcher = if config.serve.watch {
        Some(ReloadWatcher::new(&config)?)
    } else {
        None
    };

    let backend = CodeServer::new(&config.backend, config.get_root());
    let mut session = Session::new(Arc::clone(&config), backend);
    let started = session.bootstrap()?;
    if core::is_shutdown() {
        return Ok(());
    }
    if !started {
        log!("warning"; "session not started, serving static files only");
    }
    let backend_live = session.backend_live();

    let bound = bind_server(&config)?;
    // Ctrl+C that arrived before the server was registered
    if core::is_shutdown() {
        return Ok(());
    }
    let proxy = Arc::new(proxy_filter(&config));

    // The session (and the backing server it owns) lives as long as one of these.
    let (watch_handle, _session) = match watcher {
        Some(watcher) => {
            let handle = watcher.spawn(session, bound.shutdown_rx.clone())?;
            (Some(handle), None)
        }
        None => (None, Some(session)),
    };

    run_request_loop(&bound.server, &proxy, &backend_live, &config);
    lifecycle::wait_for_shutdown(watch_handle);
    Ok(())
}

fn proxy_filter(config: &StageConfig) -> ProxyFilter {
    let backend = &config.backend;
    ProxyFilter::init(InitParams {
        bind_address: &backend.bind_address,
        bind_port: &backend.port.to_string(),
        timeout: backend.timeout(),
        max_idle_connections: backend.max_idle_connections,
    })
}

fn run_request_loop(
    server: &Server,
    proxy: &Arc<ProxyFilter>,
    backend_live: &Arc<AtomicBool>,
    config: &Arc<StageConfig>,
) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let proxy = Arc::clone(proxy);
        let backend_live = Arc::clone(backend_live);
        let config = Arc::clone(config);
        pool.spawn(move || {
            let proxy = backend_live.load(Ordering::Acquire).then_some(&*proxy);
            if let Err(e) = handle_request(request, proxy, &config.serve.root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
///
/// `proxy` is `None` while no backing server is up; requests then go
/// straight to the static chain.
fn handle_request(request: Request, proxy: Option<&ProxyFilter>, root: &Path) -> Result<()> {
    if core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(proxy) = proxy {
        match proxy.filter(request.method(), request.url()) {
            Ok(Outcome::Proxied(proxied)) => return response::respond_proxied(request, proxied),
            Ok(Outcome::Continue) => {}
            Err(e) => {
                log!("proxy"; "{:#}", anyhow::Error::from(e));
                return response::respond_bad_gateway(request);
            }
        }
    }

    if let Some(path) = path::resolve_path(request.url(), root) {
        debug!("serve"; "{} -> {}", request.url(), path.display());
        return response::respond_file(request, &path);
    }

    response::respond_not_found(request)
}

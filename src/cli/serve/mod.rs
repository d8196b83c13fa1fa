//! Development server for the docs output, with live reload support.

mod content;
mod lifecycle;
mod path;
mod response;

pub use lifecycle::wait_for_shutdown;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::config::SluiceConfig;
use crate::embed::serve::LIVERELOAD_PATH;
use crate::log;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    serve_root: PathBuf,
    ws_port: Option<u16>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server for `docs.dest` without starting the request loop.
///
/// `ws_port` is the bound live reload port; `None` serves without injection.
/// Ctrl+C unblocks the server and fires the returned server's shutdown signal.
pub fn bind_server(config: &SluiceConfig, ws_port: Option<u16>) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        serve_root: config.root_join(&config.docs.dest),
        ws_port,
        shutdown_rx,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Fires once when Ctrl+C is pressed.
    pub fn shutdown_signal(&self) -> channel::Receiver<()> {
        self.shutdown_rx.clone()
    }

    /// Run the request loop until the server is unblocked.
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build()?;
        let serve_root = Arc::new(self.serve_root);

        for request in self.server.incoming_requests() {
            let serve_root = Arc::clone(&serve_root);
            let ws_port = self.ws_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &serve_root, ws_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, serve_root: &Path, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(port) = ws_port
        && request.url() == LIVERELOAD_PATH
    {
        return response::respond_livereload_js(request, port);
    }

    let reload = ws_port.is_some();
    match path::resolve_path(request.url(), serve_root) {
        Some(path) => response::respond_file(request, &path, reload),
        None => response::respond_not_found(request, serve_root, reload),
    }
}

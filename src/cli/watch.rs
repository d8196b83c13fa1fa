//! `sluice watch`: build, serve the docs and rebuild on change.
//!
//! ```text
//! main thread           orchestrator thread (tokio)
//! ───────────           ───────────────────────────
//! ws server + hub
//! watcher ──events────> Orchestrator::start (initial build, workers)
//! wait for ready <────── ready
//! http request loop     wait for Ctrl+C
//!   (until unblocked)   handle.stop()
//! wait_for_shutdown
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender, bounded};
use tokio::sync::mpsc;

use crate::build::{self, Target};
use crate::cli::serve::{self, wait_for_shutdown};
use crate::config::SluiceConfig;
use crate::log;
use crate::pipeline::Reporter;
use crate::pipeline::report::stdout_reporter;
use crate::reload::{Broadcast, ReloadHub, start_ws_server};
use crate::watch::{Binding, Orchestrator};

/// Watch bindings for `config`: style sources and docs sources.
pub fn bindings(config: &Arc<SluiceConfig>, reporter: &Arc<dyn Reporter>) -> Result<Vec<Binding>> {
    let globs = [
        (Target::Style, config.style.watch.as_str()),
        (Target::Docs, config.docs.src.as_str()),
    ];

    globs
        .into_iter()
        .map(|(target, glob)| {
            let config = Arc::clone(config);
            let reporter = Arc::clone(reporter);
            Binding::new(target.name(), glob, move || {
                build::run(target, &config, &reporter).map(|_| ())
            })
            .with_context(|| format!("invalid watch glob `{glob}`"))
        })
        .collect()
}

pub fn run_watch(config: SluiceConfig) -> Result<()> {
    let config = Arc::new(config);
    let reporter = stdout_reporter();

    let hub = ReloadHub::new();
    let ws_port = start_ws_server(config.serve.interface, config.serve.ws_port, hub.clone())?;
    hub.spawn_reader();
    crate::debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

    let broadcaster: Arc<dyn Broadcast> = Arc::new(hub.clone());
    let mut orchestrator = Orchestrator::new(&config.root, broadcaster);
    for binding in bindings(&config, &reporter)? {
        orchestrator = orchestrator.bind(binding);
    }

    // Watcher first: events buffer while the initial build runs
    let roots = orchestrator.watch_roots();
    let (watcher, events) =
        crate::watch::fs::watch(&roots).map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
    let shown: Vec<_> = roots
        .iter()
        .map(|root| config.root_relative(root).display().to_string())
        .collect();
    log!("watch"; "watching {}", shown.join(", "));

    let server = serve::bind_server(&config, Some(ws_port))?;
    let shutdown = server.shutdown_signal();
    let (orchestrator_thread, ready) = spawn_orchestrator(orchestrator, events, shutdown);

    // Serve only once the initial build is on disk
    ready.recv().ok();
    server.run()?;
    wait_for_shutdown(orchestrator_thread);
    hub.close();
    drop(watcher);
    log!("watch"; "stopped");
    Ok(())
}

/// Run `orchestrator` on its own thread until `shutdown` fires.
///
/// The returned receiver gets one message when the initial build is done.
fn spawn_orchestrator(
    orchestrator: Orchestrator,
    events: mpsc::Receiver<notify::Event>,
    shutdown: Receiver<()>,
) -> (thread::JoinHandle<()>, Receiver<()>) {
    let (ready_tx, ready_rx) = bounded(1);
    let handle = thread::spawn(move || run_orchestrator(orchestrator, events, shutdown, ready_tx));
    (handle, ready_rx)
}

fn run_orchestrator(
    orchestrator: Orchestrator,
    events: mpsc::Receiver<notify::Event>,
    shutdown: Receiver<()>,
    ready: Sender<()>,
) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("error"; "failed to start tokio runtime: {}", e);
            ready.send(()).ok();
            return;
        }
    };

    rt.block_on(async {
        let handle = orchestrator.start(events).await;
        ready.send(()).ok();
        crate::logger::status_detach();
        log!("watch"; "watching for changes, press Ctrl+C to stop");

        while shutdown.try_recv().is_err() && !crate::core::is_shutdown() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        handle.stop().await;
    });
}

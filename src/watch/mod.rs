//! Watch orchestrator.
//!
//! ```text
//! notify ─→ router ─┬─→ worker(style) ─ debounce → rebuild → broadcast reload
//!                   └─→ worker(docs)  ─ debounce → rebuild → broadcast reload
//! ```
//!
//! Each [`Binding`] ties a glob to a build action. The router sends every
//! change to the workers whose glob matches it; a worker serializes the
//! rebuilds of its binding, different bindings proceed concurrently.
//!
//! A failed rebuild is reported and skips the reload; the worker keeps
//! watching and the previous output stays in place.

mod debouncer;
pub mod fs;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::logger::{status_error, status_success};
use crate::reload::{Broadcast, ReloadMessage};
use crate::utils::path::{glob_base, normalize_path, pattern};
use debouncer::Debouncer;
use fs::ChangeKind;

/// Build action run by a binding.
pub type BuildAction = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A watch-triggered rebuild failed.
#[derive(Debug, Error)]
#[error("rebuild of `{binding}` failed")]
pub struct WatchRebuildError {
    pub binding: String,
    #[source]
    pub source: anyhow::Error,
}

/// File glob → build action.
#[derive(Clone)]
pub struct Binding {
    name: String,
    glob: String,
    pattern: Pattern,
    action: BuildAction,
}

impl Binding {
    /// `glob` is relative to the orchestrator root.
    pub fn new(
        name: impl Into<String>,
        glob: &str,
        action: impl Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Result<Self, glob::PatternError> {
        Ok(Self {
            name: name.into(),
            glob: glob.to_string(),
            pattern: Pattern::new(glob)?,
            action: Arc::new(action),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, relative: &Path) -> bool {
        pattern::matches(&self.pattern, relative)
    }

    /// Run the action on a blocking thread.
    async fn rebuild(&self) -> Result<(), WatchRebuildError> {
        let action = Arc::clone(&self.action);
        let result = tokio::task::spawn_blocking(move || action())
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("build task panicked: {e}")));
        result.map_err(|source| WatchRebuildError {
            binding: self.name.clone(),
            source,
        })
    }
}

/// Lifecycle of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Building,
    Watching,
    Stopped,
}

/// Orchestrator state plus the number of running builds.
struct StateCell(Mutex<(OrchestratorState, usize)>);

impl StateCell {
    fn new() -> Self {
        Self(Mutex::new((OrchestratorState::Idle, 0)))
    }

    fn get(&self) -> OrchestratorState {
        self.0.lock().0
    }

    fn begin_build(&self) {
        let mut guard = self.0.lock();
        guard.1 += 1;
        if guard.0 != OrchestratorState::Stopped {
            guard.0 = OrchestratorState::Building;
        }
    }

    fn end_build(&self) {
        let mut guard = self.0.lock();
        guard.1 = guard.1.saturating_sub(1);
        if guard.1 == 0 && guard.0 != OrchestratorState::Stopped {
            guard.0 = OrchestratorState::Watching;
        }
    }

    fn stop(&self) {
        self.0.lock().0 = OrchestratorState::Stopped;
    }
}

/// Owns the watch bindings and the reload broadcaster.
pub struct Orchestrator {
    root: PathBuf,
    bindings: Vec<Binding>,
    broadcaster: Arc<dyn Broadcast>,
    state: Arc<StateCell>,
}

impl Orchestrator {
    pub fn new(root: &Path, broadcaster: Arc<dyn Broadcast>) -> Self {
        Self {
            root: normalize_path(root),
            bindings: Vec::new(),
            broadcaster,
            state: Arc::new(StateCell::new()),
        }
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.get()
    }

    /// Directories a file watcher must cover: the static base of each glob.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .bindings
            .iter()
            .map(|b| self.root.join(glob_base(&b.glob)))
            .collect();
        roots.sort();
        roots.dedup();
        // Nested roots are covered by their ancestor
        let all = roots.clone();
        roots.retain(|r| !all.iter().any(|other| other != r && r.starts_with(other)));
        roots
    }

    /// Build every binding once, then route `events` to the binding workers.
    ///
    /// The initial build does not broadcast; a failure is reported and
    /// watching starts anyway.
    pub async fn start(self, events: mpsc::Receiver<notify::Event>) -> OrchestratorHandle {
        self.state.begin_build();
        let initial: Vec<_> = self
            .bindings
            .iter()
            .map(|binding| {
                let binding = binding.clone();
                tokio::spawn(async move { binding.rebuild().await })
            })
            .collect();
        let mut failed = false;
        for task in initial {
            if let Ok(Err(e)) = task.await {
                report_failure(&e);
                failed = true;
            }
        }
        if !failed {
            crate::log!("watch"; "initial build done");
        }
        self.state.end_build();

        let mut senders = Vec::with_capacity(self.bindings.len());
        let mut workers = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push((binding.clone(), tx));
            workers.push(tokio::spawn(run_worker(
                binding.clone(),
                rx,
                Arc::clone(&self.broadcaster),
                Arc::clone(&self.state),
            )));
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let router = tokio::spawn(route_events(self.root, events, senders, stop_rx));

        OrchestratorHandle {
            state: self.state,
            stop_tx: Some(stop_tx),
            router,
            workers,
        }
    }
}

/// Running orchestrator.
pub struct OrchestratorHandle {
    state: Arc<StateCell>,
    stop_tx: Option<oneshot::Sender<()>>,
    router: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl OrchestratorHandle {
    pub fn state(&self) -> OrchestratorState {
        self.state.get()
    }

    /// Stop routing events and wait for in-flight rebuilds to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        // Workers exit once the router drops their senders
        let _ = self.router.await;
        for worker in self.workers {
            let _ = worker.await;
        }
        self.state.stop();
        crate::debug!("watch"; "stopped");
    }
}

type WorkerSender = mpsc::UnboundedSender<(PathBuf, ChangeKind)>;

async fn route_events(
    root: PathBuf,
    mut events: mpsc::Receiver<notify::Event>,
    senders: Vec<(Binding, WorkerSender)>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                for (path, kind) in fs::changes(&event) {
                    let Ok(relative) = path.strip_prefix(&root) else {
                        continue;
                    };
                    for (binding, tx) in &senders {
                        if binding.matches(relative) {
                            let _ = tx.send((path.clone(), kind));
                        }
                    }
                }
            }
        }
    }
}

async fn run_worker(
    binding: Binding,
    mut rx: mpsc::UnboundedReceiver<(PathBuf, ChangeKind)>,
    broadcaster: Arc<dyn Broadcast>,
    state: Arc<StateCell>,
) {
    let mut debouncer = Debouncer::new();
    loop {
        tokio::select! {
            biased;
            change = rx.recv() => match change {
                Some((path, kind)) => debouncer.add(path, kind),
                None => break,
            },
            _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                let Some(changes) = debouncer.take_if_ready() else {
                    continue;
                };
                crate::debug!("watch"; "{}: {} changed", binding.name(), changes.len());

                state.begin_build();
                let result = binding.rebuild().await;
                state.end_build();

                match result {
                    Ok(()) => {
                        status_success(&format!("rebuilt {}", binding.name()));
                        broadcaster.broadcast(&ReloadMessage::reload(binding.name()));
                    }
                    Err(e) => report_failure(&e),
                }
            }
        }
    }
}

fn report_failure(error: &WatchRebuildError) {
    status_error(&error.to_string(), &format!("{:#}", error.source));
}

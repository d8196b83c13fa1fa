//! Orchestrator driven by in-memory events and real style builds.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use sluice::build::{self, Target};
use sluice::config::SluiceConfig;
use sluice::pipeline::{Reporter, SizeDiff, SizeRow};
use sluice::reload::{Broadcast, ReloadMessage};
use sluice::utils::path::normalize_path;
use sluice::watch::{Binding, Orchestrator, OrchestratorState};
use tempfile::TempDir;
use tokio::sync::mpsc;

struct Quiet;

impl Reporter for Quiet {
    fn size_diff(&self, _: &SizeDiff) {}

    fn size_report(&self, _: &str, _: &[SizeRow]) {}
}

#[derive(Default)]
struct Recording(Mutex<Vec<ReloadMessage>>);

impl Broadcast for Recording {
    fn broadcast(&self, message: &ReloadMessage) {
        self.0.lock().push(message.clone());
    }
}

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    style_builds: Arc<AtomicUsize>,
    docs_builds: Arc<AtomicUsize>,
    reloads: Arc<Recording>,
    orchestrator: Orchestrator,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    fs::create_dir_all(root.join("src/builds")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("src/builds/app.css"), "a { color: red }\n").unwrap();
    fs::write(root.join("docs/index.html"), "<p>docs</p>").unwrap();

    let config = Arc::new(SluiceConfig {
        root: root.clone(),
        ..SluiceConfig::default()
    });
    let reporter: Arc<dyn Reporter> = Arc::new(Quiet);
    let style_builds = Arc::new(AtomicUsize::new(0));
    let docs_builds = Arc::new(AtomicUsize::new(0));
    let reloads = Arc::new(Recording::default());

    let style = {
        let (config, reporter, count) = (config.clone(), reporter.clone(), style_builds.clone());
        let glob = config.style.watch.clone();
        Binding::new("style", &glob, move || {
            count.fetch_add(1, Ordering::SeqCst);
            build::run(Target::Style, &config, &reporter).map(|_| ())
        })
        .unwrap()
    };
    let docs = {
        let (config, reporter, count) = (config.clone(), reporter.clone(), docs_builds.clone());
        let glob = config.docs.src.clone();
        Binding::new("docs", &glob, move || {
            count.fetch_add(1, Ordering::SeqCst);
            build::run(Target::Docs, &config, &reporter).map(|_| ())
        })
        .unwrap()
    };

    let orchestrator = Orchestrator::new(&root, reloads.clone()).bind(style).bind(docs);
    Fixture {
        _temp: temp,
        root,
        style_builds,
        docs_builds,
        reloads,
        orchestrator,
    }
}

fn modified(path: &Path) -> notify::Event {
    notify::Event {
        kind: notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        )),
        paths: vec![path.to_path_buf()],
        attrs: Default::default(),
    }
}

/// Past the debounce window plus one build.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1500)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_style_change_rebuilds_style_once() {
    let f = fixture();
    let (tx, rx) = mpsc::channel(16);
    let handle = f.orchestrator.start(rx).await;

    assert_eq!(f.style_builds.load(Ordering::SeqCst), 1);
    assert_eq!(f.docs_builds.load(Ordering::SeqCst), 1);
    assert!(f.root.join("dist/app.min.css").is_file());
    assert!(f.reloads.0.lock().is_empty());

    let source = f.root.join("src/builds/app.css");
    fs::write(&source, "a { color: blue }\n").unwrap();
    tx.send(modified(&source)).await.unwrap();
    settle().await;

    assert_eq!(f.style_builds.load(Ordering::SeqCst), 2);
    assert_eq!(f.docs_builds.load(Ordering::SeqCst), 1);
    assert_eq!(*f.reloads.0.lock(), vec![ReloadMessage::reload("style")]);

    let css = fs::read_to_string(f.root.join("dist/app.css")).unwrap();
    assert!(css.contains("blue"));

    handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_rebuild_sends_no_reload() {
    let f = fixture();
    let (tx, rx) = mpsc::channel(16);
    let handle = f.orchestrator.start(rx).await;
    let before = fs::read_to_string(f.root.join("dist/app.min.css")).unwrap();

    let source = f.root.join("src/builds/app.css");
    fs::write(&source, "@import \"gone.css\";\n").unwrap();
    tx.send(modified(&source)).await.unwrap();
    settle().await;

    assert_eq!(f.style_builds.load(Ordering::SeqCst), 2);
    assert!(f.reloads.0.lock().is_empty());
    assert_eq!(
        fs::read_to_string(f.root.join("dist/app.min.css")).unwrap(),
        before
    );
    assert_eq!(handle.state(), OrchestratorState::Watching);

    handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_docs_change_rebuilds_docs_only() {
    let f = fixture();
    let (tx, rx) = mpsc::channel(16);
    let handle = f.orchestrator.start(rx).await;

    let page = f.root.join("docs/index.html");
    fs::write(&page, "<p>changed</p>").unwrap();
    tx.send(modified(&page)).await.unwrap();
    settle().await;

    assert_eq!(f.style_builds.load(Ordering::SeqCst), 1);
    assert_eq!(f.docs_builds.load(Ordering::SeqCst), 2);
    assert_eq!(*f.reloads.0.lock(), vec![ReloadMessage::reload("docs")]);

    handle.stop().await;
}

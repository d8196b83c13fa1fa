//! notify bridge: raw watcher events → `(path, ChangeKind)` pairs.

use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::utils::path::normalize_path;

const EVENT_BUFFER: usize = 64;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Start watching `roots` recursively.
///
/// Events buffer in the returned receiver until someone reads them, so the
/// watcher can start before the initial build. Missing roots are skipped.
/// The watcher must be kept alive for events to flow.
pub fn watch(roots: &[PathBuf]) -> notify::Result<(RecommendedWatcher, mpsc::Receiver<notify::Event>)> {
    // notify is sync; bridge through a std channel and a forwarding thread
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })?;

    for root in roots {
        if root.is_dir() {
            watcher.watch(root, RecursiveMode::Recursive)?;
            crate::debug!("watch"; "watching {}", root.display());
        } else {
            crate::log!("watch"; "skipping missing directory {}", root.display());
        }
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) => {
                    if tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        }
    });

    Ok((watcher, rx))
}

/// Reduce a notify event to the file changes worth rebuilding for.
///
/// Metadata-only changes (mtime/atime/chmod noise) and editor temp files
/// are dropped; paths are normalized.
pub fn changes(event: &notify::Event) -> Vec<(PathBuf, ChangeKind)> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return Vec::new(),
    };

    crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

    event
        .paths
        .iter()
        .filter(|path| !is_temp_file(path))
        .map(|path| (normalize_path(path), kind))
        .collect()
}

/// Check if path is a temp/backup file (editor artifacts).
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

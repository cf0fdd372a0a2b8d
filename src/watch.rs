//! Filesystem watcher driving the [`Synchronizer`].
//!
//! ```text
//! ┌──────────┐  Message::Fs   ┌──────────────┐  WatchEvent  ┌──────────────┐
//! │  notify  │───────────────▶│  event loop  │─────────────▶│ Synchronizer │
//! │ watcher  │                │ recv_timeout │◀─────────────│  deadlines   │
//! └──────────┘                └──────────────┘  flush_due   └──────────────┘
//!                                    ▲
//!                    Message::Stop   │
//!                   WatchHandle::stop┘
//! ```
//!
//! The loop sleeps until the next event or the earliest debounce deadline,
//! whichever comes first. Stopping drops the notify watcher, drains queued
//! events, then cancels pending writes.

use crate::naming;
use crate::sync::{Action, SyncError, Synchronizer, WatchEvent};
use log::{debug, error, info, warn};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Wait used when nothing is pending.
const IDLE_WAIT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Content directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

enum Message {
    Fs(notify::Result<Event>),
    Stop,
}

// =============================================================================
// Event translation
// =============================================================================

/// Map a notify event onto synchronizer events.
///
/// Creation and the destination side of a rename count as `Created`; content
/// changes count as `Modified`. Directory creation, metadata changes, removals
/// and the source side of a rename are dropped, as are non-markdown paths.
pub fn translate(event: &Event) -> Vec<WatchEvent> {
    let markdown = |p: &&PathBuf| naming::is_markdown_path(p);

    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .iter()
            .filter(markdown)
            .map(|p| WatchEvent::Created(p.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .get(1)
            .into_iter()
            .filter(markdown)
            .map(|p| WatchEvent::Created(p.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .filter(markdown)
            .filter(|p| p.exists())
            .map(|p| WatchEvent::Created(p.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(markdown)
            .map(|p| WatchEvent::Modified(p.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Event loop
// =============================================================================

fn report(path: &Path, result: Result<Vec<Action>, SyncError>) {
    match result {
        Ok(actions) => {
            for action in actions {
                match action {
                    Action::Schedule { path, due } => debug!(
                        "{} changed, stamping in {:?}",
                        path.display(),
                        due.saturating_duration_since(Instant::now())
                    ),
                    Action::Noop => debug!("{}: nothing to do", path.display()),
                    // Renames and writes are logged where they happen.
                    Action::Rename { .. } | Action::WriteFrontMatter { .. } => {}
                }
            }
        }
        Err(e) => error!("{e}"),
    }
}

fn event_path(event: &WatchEvent) -> &Path {
    match event {
        WatchEvent::Created(p) | WatchEvent::Modified(p) => p,
    }
}

fn run_loop(mut sync: Synchronizer, rx: Receiver<Message>) {
    loop {
        let timeout = sync
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        match rx.recv_timeout(timeout) {
            Ok(Message::Fs(Ok(event))) => {
                for ev in translate(&event) {
                    let result = sync.handle(&ev);
                    report(event_path(&ev), result);
                }
            }
            Ok(Message::Fs(Err(e))) => warn!("watch error: {e}"),
            Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        for (path, result) in sync.flush_due(Instant::now()) {
            report(&path, result);
        }
    }

    let dropped = sync.cancel_pending();
    if dropped > 0 {
        info!("Dropped {dropped} pending update(s)");
    }
}

// =============================================================================
// Public API
// =============================================================================

/// A running watcher. Stops on [`WatchHandle::stop`] or when dropped.
pub struct WatchHandle {
    tx: Sender<Message>,
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stop watching and wait for the event loop to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // No new events once the watcher is gone; queued ones still drain.
        drop(self.watcher.take());
        let _ = self.tx.send(Message::Stop);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("Watch thread panicked");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start watching `root` recursively on a background thread.
///
/// Body digests of existing files are recorded first, so opening and
/// re-saving an untouched file right after start is a no-op.
pub fn start(root: &Path, debounce: Duration) -> Result<WatchHandle, WatchError> {
    if !root.is_dir() {
        return Err(WatchError::NotFound(root.to_path_buf()));
    }
    // notify reports absolute paths
    let root = root.canonicalize()?;

    let mut sync = Synchronizer::new(&root, debounce);
    let primed = sync.prime();
    info!(
        "Watching {} ({primed} files, debounce {}s)",
        root.display(),
        debounce.as_secs()
    );

    let (tx, rx) = mpsc::channel();
    let fs_tx = tx.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = fs_tx.send(Message::Fs(res));
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    let thread = thread::Builder::new()
        .name("docnav-watch".into())
        .spawn(move || run_loop(sync, rx))?;

    Ok(WatchHandle {
        tx,
        watcher: Some(watcher),
        thread: Some(thread),
    })
}

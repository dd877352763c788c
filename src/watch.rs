//! File change notifications delivered to a dedicated worker thread.
//!
//! Raw `notify` events go through a `notify-debouncer-mini` debouncer, which
//! folds a burst of writes inside the debounce window into one batch. The
//! debouncer callback never runs a reconciliation itself: it only pushes a
//! message onto a channel drained by a single worker, which makes passes
//! strictly sequential.
//!
//! The parent directory is watched non-recursively and events are filtered
//! by file name, so editors that save by writing a temp file and renaming it
//! over the original are still seen.

use std::{
    ffi::{OsStr, OsString},
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

use crate::error::{Result, SourceError};

#[derive(Debug)]
pub enum WatchSignal {
    Changed,
    Failed(notify::Error),
}

#[derive(Debug)]
enum WatchMessage {
    Changed,
    Failed(notify::Error),
    Stop,
}

pub struct ChangeWatcher {
    directory: PathBuf,
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    sender: Sender<WatchMessage>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Subscribes to changes of `path` and runs `on_change` on the worker
    /// thread once per debounced batch until it returns `Break` or the
    /// watcher is stopped.
    pub fn spawn<F>(path: &Path, debounce: Duration, on_change: F) -> Result<Self>
    where
        F: FnMut(WatchSignal) -> ControlFlow<()> + Send + 'static,
    {
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| SourceError::MissingFile(path.to_path_buf()))?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| SourceError::MissingFile(path.to_path_buf()))?;

        let (sender, receiver) = mpsc::channel();
        let event_sender = sender.clone();
        let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| {
            let message = match res {
                Ok(events) if events.iter().any(|event| is_relevant(&event.path, &file_name)) => {
                    WatchMessage::Changed
                }
                Ok(_) => return,
                Err(err) => WatchMessage::Failed(err),
            };
            let _ = event_sender.send(message);
        })?;
        debouncer
            .watcher()
            .watch(&directory, RecursiveMode::NonRecursive)?;

        let stopped = Arc::new(AtomicBool::new(false));
        let worker_stopped = Arc::clone(&stopped);
        let worker = thread::Builder::new()
            .name("csv-live-watch".to_string())
            .spawn(move || run_worker(receiver, worker_stopped, on_change))?;
        info!("Watching {:?} for changes (debounce {:?})", path, debounce);

        Ok(Self {
            directory,
            debouncer: Some(debouncer),
            sender,
            stopped,
            worker: Some(worker),
        })
    }

    /// Unsubscribes and joins the worker. Once this returns no further pass
    /// can start, and a pass already running has completed.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(mut debouncer) = self.debouncer.take() {
            if let Err(err) = debouncer.watcher().unwatch(&self.directory) {
                debug!("Unwatching {:?} failed: {err}", self.directory);
            }
        }
        let _ = self.sender.send(WatchMessage::Stop);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Watch worker for {:?} panicked", self.directory);
            }
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_relevant(path: &Path, file_name: &OsStr) -> bool {
    path.file_name() == Some(file_name)
}

fn run_worker<F>(receiver: Receiver<WatchMessage>, stopped: Arc<AtomicBool>, mut on_change: F)
where
    F: FnMut(WatchSignal) -> ControlFlow<()>,
{
    while let Ok(message) = receiver.recv() {
        let signal = match message {
            WatchMessage::Stop => break,
            WatchMessage::Failed(err) => WatchSignal::Failed(err),
            WatchMessage::Changed => WatchSignal::Changed,
        };
        if stopped.load(Ordering::SeqCst) {
            break;
        }
        if on_change(signal).is_break() {
            debug!("Watch worker finished");
            break;
        }
    }
}

//! Data source session: load, column report, paging and live updates.
//!
//! ```text
//! Unconfigured --load ok--> Loaded --start_updates--> Watching
//! Unconfigured --load error--> Failed
//! Watching --column set changed on reload--> Failed
//! Loaded | Watching --stop_updates--> Stopped
//! ```
//!
//! The published snapshot sits behind an `RwLock<Option<Arc<_>>>`. A live pass
//! builds its rows off-lock and swaps them in with a single write, so page
//! reads always see either the old or the new row set, never a mix.

use std::{
    fmt,
    ops::ControlFlow,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::SourceConfig,
    error::{Result, SourceError},
    reconcile::{RowConsumer, reconcile},
    schema::{ColumnSpec, HeaderInfo},
    snapshot::{Row, Snapshot, read_snapshot},
    watch::{ChangeWatcher, WatchSignal},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceState {
    Unconfigured,
    Loaded,
    Watching,
    Stopped,
    Failed,
}

impl SourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceState::Unconfigured => "unconfigured",
            SourceState::Loaded => "loaded",
            SourceState::Watching => "watching",
            SourceState::Stopped => "stopped",
            SourceState::Failed => "failed",
        }
    }

    fn has_snapshot(&self) -> bool {
        matches!(
            self,
            SourceState::Loaded | SourceState::Watching | SourceState::Stopped
        )
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SourceState>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn published(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: Option<Arc<Snapshot>>) -> Option<Arc<Snapshot>> {
        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, snapshot)
    }

    fn fail(&self) {
        self.publish(None);
        *self.state() = SourceState::Failed;
    }
}

pub struct DataSource {
    config: SourceConfig,
    shared: Arc<Shared>,
    watcher: Option<ChangeWatcher>,
}

impl DataSource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(SourceState::Unconfigured),
                snapshot: RwLock::new(None),
            }),
            watcher: None,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn state(&self) -> SourceState {
        *self.shared.state()
    }

    /// Reads the backing file and publishes its snapshot. Any failure leaves
    /// the session `Failed` with nothing published.
    pub fn load(&mut self) -> Result<()> {
        self.expect_state("load", &[SourceState::Unconfigured])?;
        match read_snapshot(&self.config) {
            Ok(snapshot) => {
                info!(
                    "Loaded {} row(s) with columns [{}] from {:?}",
                    snapshot.count(),
                    snapshot.header.describe(),
                    self.config.path
                );
                self.shared.publish(Some(Arc::new(snapshot)));
                *self.shared.state() = SourceState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.shared.fail();
                Err(err)
            }
        }
    }

    pub fn header(&self) -> Result<HeaderInfo> {
        Ok(self.snapshot("report columns")?.header.clone())
    }

    pub fn columns(&self) -> Result<Vec<ColumnSpec>> {
        Ok(self.snapshot("report columns")?.columns().to_vec())
    }

    /// Every currently published row, as one page.
    pub fn page(&self) -> Result<Vec<Row>> {
        Ok(self.snapshot("read a page")?.rows.clone())
    }

    pub fn current_snapshot(&self) -> Result<Arc<Snapshot>> {
        self.snapshot("read the snapshot")
    }

    pub fn start_updates<C>(&mut self, consumer: C) -> Result<()>
    where
        C: RowConsumer + 'static,
    {
        self.expect_state("start updates", &[SourceState::Loaded])?;
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let mut consumer = consumer;
        // The first pass may already fail the session, so it has to find
        // `Watching` in place rather than have it stored afterwards.
        *self.shared.state() = SourceState::Watching;
        let spawned = ChangeWatcher::spawn(&self.config.path, self.config.debounce, move |signal| {
            match signal {
                WatchSignal::Changed => reconcile_pass(&shared, &config, &mut consumer),
                WatchSignal::Failed(err) => {
                    consumer.report_error(&SourceError::Watch(err));
                    ControlFlow::Continue(())
                }
            }
        });
        match spawned {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                Ok(())
            }
            Err(err) => {
                *self.shared.state() = SourceState::Loaded;
                Err(err)
            }
        }
    }

    /// Unsubscribes from change notifications and waits for an in-flight
    /// pass to finish. Stopping is final; the last snapshot stays readable.
    pub fn stop_updates(&mut self) -> Result<()> {
        let state = self.state();
        match state {
            SourceState::Unconfigured => {
                return Err(SourceError::InvalidState {
                    operation: "stop updates",
                    state,
                });
            }
            SourceState::Stopped => return Ok(()),
            _ => {}
        }
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        let mut current = self.shared.state();
        if *current != SourceState::Failed {
            *current = SourceState::Stopped;
        }
        info!("Stopped updates for {:?}", self.config.path);
        Ok(())
    }

    fn snapshot(&self, operation: &'static str) -> Result<Arc<Snapshot>> {
        let state = self.state();
        if !state.has_snapshot() {
            return Err(SourceError::InvalidState { operation, state });
        }
        self.shared
            .published()
            .ok_or(SourceError::InvalidState { operation, state })
    }

    fn expect_state(&self, operation: &'static str, allowed: &[SourceState]) -> Result<()> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(SourceError::InvalidState { operation, state })
        }
    }
}

fn reconcile_pass(
    shared: &Shared,
    config: &SourceConfig,
    consumer: &mut dyn RowConsumer,
) -> ControlFlow<()> {
    let fresh = match read_snapshot(config) {
        Ok(fresh) => Arc::new(fresh),
        Err(err) => {
            if err.is_transient() {
                debug!("Reload of {:?} failed, retrying on next change: {err}", config.path);
            } else {
                warn!("Reload of {:?} failed; keeping previous rows: {err}", config.path);
            }
            consumer.report_error(&err);
            return ControlFlow::Continue(());
        }
    };

    let Some(previous) = shared.published() else {
        return ControlFlow::Break(());
    };
    if !previous.header.same_columns(&fresh.header) {
        let err = SourceError::SchemaChanged {
            expected: previous.header.describe(),
            found: fresh.header.describe(),
        };
        warn!("{err}");
        shared.fail();
        consumer.report_error(&err);
        return ControlFlow::Break(());
    }

    shared.publish(Some(Arc::clone(&fresh)));
    let count = reconcile(previous.count(), &fresh.rows, consumer);
    debug!(
        "Reconciled {:?}: {} row(s) -> {} row(s)",
        config.path,
        previous.count(),
        count
    );
    ControlFlow::Continue(())
}

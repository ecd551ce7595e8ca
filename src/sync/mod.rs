//! Refresh lifecycle for the participant record set.
//!
//! The [`SyncController`] owns the one authoritative in-memory view of the
//! records and keeps it current from three triggers: a startup refresh, a
//! fixed-interval poll, and `records_updated` notifications on the bus.
//! Consumers never touch controller state directly; they read cloned
//! [`Snapshot`]s through a watch channel or the `snapshot()` accessor.

pub mod bus;

use crate::models::Participant;
use crate::store::RecordStore;
use bus::UpdateBus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// How often the background poll fires.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Externally observable fetch state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Last fetch succeeded (or none attempted yet).
    Idle,
    /// A fetch is in flight.
    Syncing,
    /// Last fetch failed; stale records are retained.
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Read-only copy of the controller state handed to consumers.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Last successfully fetched records, in store order.
    pub records: Vec<Participant>,
    pub status: SyncStatus,
    /// Visible-loading flag: set for startup and manual refreshes so the
    /// display layer can distinguish first paint from background refresh.
    pub loading: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: SyncStatus::Idle,
            loading: false,
        }
    }
}

/// Controller tuning.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

struct State {
    records: Vec<Participant>,
    status: SyncStatus,
    loading: bool,
}

struct Inner {
    store: Arc<dyn RecordStore>,
    state: Mutex<State>,
    /// Monotonically increasing refresh token. A completed fetch is applied
    /// only while its token is still the latest issued, so overlapping
    /// refreshes resolve last-issued-wins instead of last-completed-wins.
    issued: AtomicU64,
    disposed: AtomicBool,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Inner {
    fn publish(&self, state: &State) {
        self.snapshot_tx.send_replace(Snapshot {
            records: state.records.clone(),
            status: state.status,
            loading: state.loading,
        });
    }

    async fn refresh(&self, show_loading: bool) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.lock().expect("sync state lock poisoned");
            state.status = SyncStatus::Syncing;
            if show_loading {
                state.loading = true;
            }
            self.publish(&state);
        }

        let result = self.store.fetch_all().await;

        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        let mut state = self.state.lock().expect("sync state lock poisoned");

        if token != self.issued.load(Ordering::SeqCst) {
            debug!("Discarding superseded fetch result (token {})", token);
            return;
        }

        match result {
            Ok(records) => {
                debug!("Refresh applied: {} records", records.len());
                state.records = records;
                state.status = SyncStatus::Idle;
            }
            Err(e) => {
                // Stale records are retained; the next trigger may self-heal.
                warn!("Record fetch failed: {}", e);
                state.status = SyncStatus::Error;
            }
        }
        state.loading = false;
        self.publish(&state);
    }
}

/// Owns the refresh lifecycle of the participant records.
pub struct SyncController {
    inner: Arc<Inner>,
    bus: UpdateBus,
    interval: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncController {
    /// Build a controller. No fetch is attempted until [`start`] or a
    /// manual [`refresh`]; the initial status is idle with no records.
    ///
    /// [`start`]: SyncController::start
    /// [`refresh`]: SyncController::refresh
    pub fn new(store: Arc<dyn RecordStore>, bus: UpdateBus, config: SyncConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());

        Self {
            inner: Arc::new(Inner {
                store,
                state: Mutex::new(State {
                    records: Vec::new(),
                    status: SyncStatus::Idle,
                    loading: false,
                }),
                issued: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                snapshot_tx,
            }),
            bus,
            interval: config.interval,
            tasks: Vec::new(),
        }
    }

    /// Begin the refresh lifecycle.
    ///
    /// Spawns the poll task, whose immediate first tick doubles as the
    /// startup refresh with the visible-loading flag, and the bus listener
    /// that refreshes without it. Calling `start` twice is a no-op.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let interval = self.interval;
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // First tick completes immediately: the startup refresh.
            ticker.tick().await;
            inner.refresh(true).await;

            loop {
                ticker.tick().await;
                inner.refresh(false).await;
            }
        }));

        let inner = Arc::clone(&self.inner);
        let mut notifications = self.bus.subscribe();
        self.tasks.push(tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    // A lagged receiver still means records changed somewhere.
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        inner.refresh(false).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Refresh now. Fetch failures are absorbed into the error status and
    /// never propagate to the caller.
    pub async fn refresh(&self, show_loading: bool) {
        self.inner.refresh(show_loading).await;
    }

    /// Current state as a read-only copy.
    #[allow(dead_code)] // Pull-style accessor alongside subscribe()
    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.lock().expect("sync state lock poisoned");
        Snapshot {
            records: state.records.clone(),
            status: state.status,
            loading: state.loading,
        }
    }

    /// Watch for state changes; each published value is a full snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Stop polling and listening. In-flight fetch results arriving after
    /// this point are discarded. Also invoked on drop.
    pub fn shutdown(&mut self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

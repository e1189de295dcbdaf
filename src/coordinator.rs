//! Sync coordinator.
//!
//! Drains the pending-action queue against the network when connectivity
//! allows. A drain cycle is triggered by an offline→online transition on
//! the connectivity watch (see [`SyncCoordinator::spawn`]) or by an
//! explicit [`SyncCoordinator::sync_pending_actions`] call.
//!
//! # State machine
//!
//! ```text
//! Idle ──trigger──► Draining ──cycle done──► Idle
//!          ▲             │
//!          └── trigger while Draining is coalesced (dropped)
//! ```
//!
//! A trigger arriving mid-drain is dropped, not queued: the in-flight cycle
//! already works from a fresh queue snapshot, but no re-trigger is
//! guaranteed, so callers that must observe a full pass flush again after
//! the first completes.
//!
//! # Failure semantics
//!
//! Per-action failures (network error or non-2xx status) are logged and the
//! action stays queued; they never abort the remaining queue and never
//! reach the caller. Replays are assumed idempotent or safely retryable by
//! the caller's choice of action semantics. The only error a drain cycle
//! itself returns is a storage failure reading the queue snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::storage::traits::StorageError;
use crate::store::OfflineStore;
use crate::transport::Transport;

/// Coordinator state, published on a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Draining => write!(f, "Draining"),
        }
    }
}

/// Tally of one completed drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Actions a request was issued for.
    pub attempted: usize,
    /// Actions confirmed by a 2xx response and removed from the queue.
    pub replayed: usize,
    /// Actions still queued after the cycle (failed, rejected, or skipped
    /// because connectivity dropped mid-cycle).
    pub left_queued: usize,
}

/// How a drain trigger resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The cycle ran over the full queue snapshot.
    Completed(DrainReport),
    /// Connectivity was down at cycle start; zero network calls were made
    /// and the queue is untouched.
    Offline,
    /// Another drain was in flight; this trigger was dropped.
    Coalesced,
}

pub struct SyncCoordinator {
    store: Arc<OfflineStore>,
    transport: Arc<dyn Transport>,
    connectivity: watch::Receiver<bool>,
    /// Mutual exclusion of drain cycles. Checked with compare-and-swap so
    /// concurrent triggers coalesce instead of double-draining.
    draining: AtomicBool,
    state: watch::Sender<SyncState>,
    state_rx: watch::Receiver<SyncState>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<OfflineStore>,
        transport: Arc<dyn Transport>,
        connectivity: watch::Receiver<bool>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SyncState::Idle);
        Self {
            store,
            transport,
            connectivity,
            draining: AtomicBool::new(false),
            state: state_tx,
            state_rx,
        }
    }

    /// Current coordinator state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        *self.state_rx.borrow()
    }

    /// A receiver to watch state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }

    fn is_online(&self) -> bool {
        *self.connectivity.borrow()
    }

    /// Run one drain cycle (explicit flush).
    ///
    /// Snapshot the queue, then replay each action in ascending
    /// `enqueued_at` order: 2xx removes it, anything else leaves it queued
    /// for the next connectivity event or flush. Connectivity loss
    /// mid-cycle lets the in-flight request finish and leaves the rest
    /// queued without issuing new requests.
    pub async fn sync_pending_actions(&self) -> Result<DrainOutcome, StorageError> {
        if self.draining.swap(true, Ordering::AcqRel) {
            debug!("Drain already in flight, trigger coalesced");
            return Ok(DrainOutcome::Coalesced);
        }
        let _guard = DrainGuard {
            flag: &self.draining,
            state: &self.state,
        };
        let _ = self.state.send(SyncState::Draining);

        if !self.is_online() {
            debug!("Connectivity down, drain aborted without side effects");
            return Ok(DrainOutcome::Offline);
        }

        let actions = self.store.list_pending_actions().await?;
        if actions.is_empty() {
            debug!("Pending queue empty, nothing to drain");
            return Ok(DrainOutcome::Completed(DrainReport {
                attempted: 0,
                replayed: 0,
                left_queued: 0,
            }));
        }

        info!(queued = actions.len(), "Starting drain cycle");

        let mut attempted = 0;
        let mut replayed = 0;

        for action in &actions {
            if !self.is_online() {
                warn!(
                    remaining = actions.len() - attempted,
                    "Connectivity lost mid-drain, leaving remaining actions queued"
                );
                break;
            }

            attempted += 1;
            match self.transport.send(action).await {
                Ok(status) if (200..300).contains(&status) => {
                    match self.store.remove_pending_action(&action.id).await {
                        Ok(()) => {
                            replayed += 1;
                            info!(id = %action.id, status, "Pending action replayed");
                        }
                        Err(e) => {
                            // The action stays queued and will replay again;
                            // replays are assumed safely retryable.
                            error!(id = %action.id, error = %e, "Replay confirmed but removal failed");
                        }
                    }
                }
                Ok(status) => {
                    warn!(id = %action.id, status, "Remote rejected pending action, leaving queued");
                }
                Err(e) => {
                    warn!(id = %action.id, error = %e, "Network failure replaying pending action, leaving queued");
                }
            }
        }

        let report = DrainReport {
            attempted,
            replayed,
            left_queued: actions.len() - replayed,
        };
        info!(
            attempted = report.attempted,
            replayed = report.replayed,
            left_queued = report.left_queued,
            "Drain cycle complete"
        );
        Ok(DrainOutcome::Completed(report))
    }

    /// Spawn the background watcher that drains on every offline→online
    /// transition. The task ends when the connectivity sender is dropped;
    /// abort the handle for an earlier teardown.
    ///
    /// The watch channel stores only the latest value, so a rapid
    /// offline→online toggle can collapse into a single wake. The source
    /// only publishes real transitions, so observing `true` after any wake
    /// means the latest transition was to online — drain on that alone,
    /// without tracking the previously observed value.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        let mut rx = self.connectivity.clone();

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if *rx.borrow_and_update() {
                    info!("Connectivity restored, draining pending actions");
                    if let Err(e) = coordinator.sync_pending_actions().await {
                        error!(error = %e, "Drain cycle could not read the pending queue");
                    }
                }
            }
            debug!("Connectivity source dropped, sync watcher exiting");
        })
    }
}

/// Resets the drain flag and published state on every exit path.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<SyncState>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        let _ = self.state.send(SyncState::Idle);
    }
}

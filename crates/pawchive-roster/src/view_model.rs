//! Roster view-model
//!
//! Keeps a snapshot of the stray collection current for one screen:
//! - Full refetch on mount, on every change event and on pull-to-refresh
//! - Fetch sequence numbers so an older result never overwrites a newer one
//! - In-flight tracking so a cancelled fetch never leaves the phase busy
//! - A liveness flag checked under the state lock, so nothing lands after
//!   teardown
//! - Filtered projections computed on demand, never stored
//!
//! All state writes go through the watch sender's modify closure, which is
//! the single critical section for apply, stale-check and shutdown.

use crate::config::RosterConfig;
use crate::detail::StrayDetail;
use crate::error::RosterError;
use crate::favorites::FavoriteSet;
use crate::filter::{apply_filter, Category};
use crate::state::{FetchOutcome, LoadKind, RosterPhase, RosterState};
use pawchive_model::{StrayId, StrayRecord};
use pawchive_store::{DataSource, FeedSubscription, SelectQuery, SubscriptionId};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Active change listener
struct Listener {
    id: SubscriptionId,
    task: JoinHandle<()>,
}

struct Inner {
    source: DataSource,
    config: RosterConfig,
    query: SelectQuery,
    state: watch::Sender<RosterState>,
    /// Last issued fetch sequence number
    issued: AtomicU64,
    /// Sequence numbers issued but not yet settled; locked inside the
    /// state closure only
    in_flight: Mutex<BTreeSet<u64>>,
    alive: AtomicBool,
    listener: Mutex<Option<Listener>>,
    favorites: FavoriteSet,
}

impl Inner {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Clear the liveness flag under the state lock; true if it was set
    fn shut_down(&self) -> bool {
        let mut was_alive = false;
        self.state.send_if_modified(|_| {
            was_alive = self.alive.swap(false, Ordering::SeqCst);
            false
        });
        was_alive
    }

    /// Forget a fetch that ended without applying a result
    ///
    /// When it was the last one in flight the busy phase falls back to what
    /// the snapshot shows.
    fn abandon(&self, seq: u64) {
        self.state.send_if_modified(|state| {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.remove(&seq) || !in_flight.is_empty() {
                return false;
            }
            if !self.is_alive() || !state.phase.is_busy() {
                return false;
            }
            state.phase = if state.error.is_some() {
                RosterPhase::Error
            } else if state.applied_seq == 0 {
                RosterPhase::Idle
            } else {
                RosterPhase::Ready
            };
            tracing::debug!(seq, phase = %state.phase, "cancelled fetch settled");
            true
        });
    }

    async fn fetch(&self, kind: LoadKind) -> FetchOutcome {
        if !self.is_alive() {
            return FetchOutcome::Discarded { seq: 0 };
        }
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_if_modified(|state| {
            self.in_flight.lock().insert(seq);
            if !self.is_alive() {
                return false;
            }
            let phase = if kind == LoadKind::Refresh && !state.snapshot.is_empty() {
                RosterPhase::Refreshing
            } else {
                RosterPhase::Loading
            };
            if state.phase == phase {
                return false;
            }
            state.phase = phase;
            true
        });
        let guard = InFlight { inner: self, seq };
        tracing::debug!(seq, %kind, collection = %self.query.collection, "fetch issued");

        let result = self.source.query.select(&self.query).await;

        let mut outcome = FetchOutcome::Discarded { seq };
        self.state.send_if_modified(|state| {
            let mut in_flight = self.in_flight.lock();
            in_flight.remove(&seq);
            if !self.is_alive() {
                return false;
            }
            if seq <= state.applied_seq {
                outcome = FetchOutcome::Stale { seq };
                if in_flight.is_empty() && state.phase.is_busy() {
                    state.phase = if state.error.is_some() {
                        RosterPhase::Error
                    } else {
                        RosterPhase::Ready
                    };
                    return true;
                }
                return false;
            }
            // A newer fetch is still in flight: keep showing it as busy.
            let superseded = in_flight.last().is_some_and(|&newest| newest > seq);
            drop(in_flight);
            state.applied_seq = seq;
            match result {
                Ok(records) => {
                    outcome = FetchOutcome::Applied {
                        seq,
                        count: records.len(),
                    };
                    state.snapshot = Arc::new(records);
                    state.error = None;
                    if !superseded {
                        state.phase = RosterPhase::Ready;
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    state.snapshot = Arc::new(Vec::new());
                    state.error = Some(message.clone());
                    if !superseded {
                        state.phase = RosterPhase::Error;
                    }
                    outcome = FetchOutcome::Failed { seq, message };
                }
            }
            true
        });
        drop(guard);

        match &outcome {
            FetchOutcome::Applied { count, .. } => {
                tracing::debug!(seq, count, "fetch applied");
            }
            FetchOutcome::Failed { message, .. } => {
                tracing::warn!(seq, error = %message, "fetch failed");
            }
            FetchOutcome::Stale { .. } => {
                tracing::debug!(seq, "stale fetch result dropped");
            }
            FetchOutcome::Discarded { .. } => {
                tracing::debug!(seq, "fetch result discarded after teardown");
            }
        }
        outcome
    }
}

/// Settles a fetch whose future is dropped before its result is applied
struct InFlight<'a> {
    inner: &'a Inner,
    seq: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.abandon(self.seq);
    }
}

/// Turn every change event into a full refetch
///
/// Holds only a weak reference, so a dropped roster stops the loop.
async fn listen(roster: Weak<Inner>, mut subscription: FeedSubscription) {
    let id = subscription.id();
    while let Some(event) = subscription.recv().await {
        let Some(inner) = roster.upgrade() else {
            break;
        };
        if !inner.is_alive() {
            break;
        }
        tracing::debug!(subscription = %id, kind = ?event.kind, "change event, refetching");
        tokio::spawn(async move {
            inner.fetch(LoadKind::Change).await;
        });
    }
    tracing::debug!(subscription = %id, "change listener stopped");
}

/// Live roster for one screen
///
/// Not `Clone`: dropping the roster tears it down. Share it behind an `Arc`
/// when several tasks need it.
pub struct RosterViewModel {
    inner: Arc<Inner>,
}

impl RosterViewModel {
    /// Create an idle roster over `source`
    #[must_use]
    pub fn new(source: DataSource, config: RosterConfig) -> Self {
        let query = config.select_query();
        let (state, _) = watch::channel(RosterState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                query,
                state,
                issued: AtomicU64::new(0),
                in_flight: Mutex::new(BTreeSet::new()),
                alive: AtomicBool::new(true),
                listener: Mutex::new(None),
                favorites: FavoriteSet::new(),
            }),
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RosterConfig {
        &self.inner.config
    }

    /// Subscribe to changes, then load the collection
    ///
    /// Subscribing first means a write racing the initial load still
    /// triggers a refetch.
    ///
    /// # Errors
    /// - `RosterError::TornDown` after teardown
    /// - `RosterError::Store` if the change feed cannot be opened
    pub async fn mount(&self) -> Result<FetchOutcome, RosterError> {
        self.subscribe().await?;
        let outcome = self.inner.fetch(LoadKind::Initial).await;
        tracing::info!(collection = %self.inner.query.collection, ?outcome, "roster mounted");
        Ok(outcome)
    }

    /// Read the whole collection and replace the snapshot
    ///
    /// Never fails: errors are applied to the state and reported in the
    /// outcome.
    pub async fn fetch(&self, kind: LoadKind) -> FetchOutcome {
        self.inner.fetch(kind).await
    }

    /// Pull-to-refresh
    pub async fn refresh(&self) -> FetchOutcome {
        self.inner.fetch(LoadKind::Refresh).await
    }

    /// Open the change listener
    ///
    /// Returns `false` when already subscribed; at most one listener exists
    /// per roster.
    ///
    /// # Errors
    /// - `RosterError::TornDown` after teardown
    /// - `RosterError::Store` if the change feed cannot be opened
    pub async fn subscribe(&self) -> Result<bool, RosterError> {
        if !self.inner.is_alive() {
            return Err(RosterError::TornDown);
        }
        if self.inner.listener.lock().is_some() {
            return Ok(false);
        }

        let subscription = self
            .inner
            .source
            .feed
            .subscribe(&self.inner.query.collection)
            .await?;

        let mut slot = self.inner.listener.lock();
        if !self.inner.is_alive() {
            return Err(RosterError::TornDown);
        }
        if slot.is_some() {
            // Lost a race with a concurrent subscribe; dropping releases ours.
            return Ok(false);
        }

        let id = subscription.id();
        let task = tokio::spawn(listen(Arc::downgrade(&self.inner), subscription));
        *slot = Some(Listener { id, task });
        tracing::info!(subscription = %id, collection = %self.inner.query.collection, "change listener opened");
        Ok(true)
    }

    /// Close the change listener
    ///
    /// Returns once the subscription has been released. `false` when there
    /// was nothing to close.
    pub async fn unsubscribe(&self) -> bool {
        let listener = self.inner.listener.lock().take();
        let Some(Listener { id, task }) = listener else {
            return false;
        };
        task.abort();
        // Completes after the task, and with it the subscription, is dropped.
        let _ = task.await;
        tracing::info!(subscription = %id, "change listener released");
        true
    }

    /// Whether a change listener is open
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.inner.listener.lock().is_some()
    }

    /// Stop applying results and release the change listener
    ///
    /// Fetches still in flight complete as `Discarded`. Idempotent.
    pub async fn teardown(&self) {
        let was_alive = self.inner.shut_down();
        self.unsubscribe().await;
        if was_alive {
            tracing::info!(collection = %self.inner.query.collection, "roster torn down");
        }
    }

    /// Whether the roster still applies results
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> RosterState {
        self.inner.state.borrow().clone()
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<StrayRecord>> {
        Arc::clone(&self.inner.state.borrow().snapshot)
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<RosterState> {
        self.inner.state.subscribe()
    }

    /// Snapshot filtered by search text and category, in snapshot order
    #[must_use]
    pub fn visible(&self, query: &str, category: Category) -> Vec<StrayRecord> {
        let snapshot = self.snapshot();
        apply_filter(&snapshot, query, category)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record with `id` in the current snapshot
    #[must_use]
    pub fn find(&self, id: &StrayId) -> Option<StrayRecord> {
        self.snapshot().iter().find(|r| r.id == *id).cloned()
    }

    /// Detail view of the stray with `id`
    #[must_use]
    pub fn detail(&self, id: &StrayId) -> Option<StrayDetail> {
        let record = self.find(id)?;
        let is_favorite = self.inner.favorites.contains(id);
        Some(StrayDetail::new(
            record,
            &self.inner.config.placeholder_image_url,
            is_favorite,
        ))
    }

    /// Flip the view-local favorite flag, returning the new value
    pub fn toggle_favorite(&self, id: &StrayId) -> bool {
        self.inner.favorites.toggle(id)
    }

    /// Whether `id` is a favorite
    #[must_use]
    pub fn is_favorite(&self, id: &StrayId) -> bool {
        self.inner.favorites.contains(id)
    }

    /// View-local favorites
    #[inline]
    #[must_use]
    pub fn favorites(&self) -> &FavoriteSet {
        &self.inner.favorites
    }
}

impl Drop for RosterViewModel {
    fn drop(&mut self) {
        if self.inner.shut_down() {
            tracing::debug!("roster dropped without teardown");
        }
        if let Some(listener) = self.inner.listener.lock().take() {
            listener.task.abort();
        }
    }
}

impl fmt::Debug for RosterViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RosterViewModel")
            .field("collection", &self.inner.query.collection)
            .field("phase", &state.phase)
            .field("rows", &state.snapshot.len())
            .field("alive", &self.inner.is_alive())
            .finish_non_exhaustive()
    }
}

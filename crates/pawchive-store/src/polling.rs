//! Change feed built from periodic reads
//!
//! Each subscription runs its own poll task. A result whose blake3
//! fingerprint differs from the previous one produces a single
//! `ChangeKind::Unknown` event. The first poll only sets the baseline.

use crate::error::StoreError;
use crate::feed::{ChangeEvent, ChangeKind, FeedSubscription, SubscriptionId, FEED_BUFFER};
use crate::query::SelectQuery;
use crate::source::{ChangeFeed, StrayQuery};
use async_trait::async_trait;
use pawchive_model::StrayRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Polling change feed over any query backend
#[derive(Clone)]
pub struct PollingFeed {
    query: Arc<dyn StrayQuery>,
    interval: Duration,
}

impl PollingFeed {
    /// Poll `query` every `interval`
    #[inline]
    pub fn new(query: Arc<dyn StrayQuery>, interval: Duration) -> Self {
        Self { query, interval }
    }

    /// Polling interval
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for PollingFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingFeed")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Content fingerprint of a result set
#[must_use]
pub fn fingerprint(records: &[StrayRecord]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        if let Ok(bytes) = serde_json::to_vec(record) {
            hasher.update(&bytes);
        }
        hasher.update(&[0]);
    }
    hasher.finalize()
}

async fn poll_loop(
    id: SubscriptionId,
    query: Arc<dyn StrayQuery>,
    check: SelectQuery,
    interval: Duration,
    events: mpsc::Sender<ChangeEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<blake3::Hash> = None;

    loop {
        ticker.tick().await;
        if events.is_closed() {
            break;
        }

        match query.select(&check).await {
            Ok(records) => {
                let current = fingerprint(&records);
                if last.is_some_and(|prev| prev != current) {
                    tracing::debug!(subscription = %id, collection = %check.collection, "poll detected change");
                    let event = ChangeEvent::new(check.collection.clone(), ChangeKind::Unknown);
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                last = Some(current);
            }
            Err(e) => {
                tracing::warn!(subscription = %id, collection = %check.collection, error = %e, "poll failed");
            }
        }
    }
    tracing::debug!(subscription = %id, "poll task stopped");
}

#[async_trait]
impl ChangeFeed for PollingFeed {
    async fn subscribe(&self, collection: &str) -> Result<FeedSubscription, StoreError> {
        let id = SubscriptionId::new();
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let check = SelectQuery::newest_first(collection);

        let task = tokio::spawn(poll_loop(
            id,
            Arc::clone(&self.query),
            check,
            self.interval,
            tx,
        ));
        tracing::info!(subscription = %id, collection, interval_ms = self.interval.as_millis() as u64, "polling change feed started");

        Ok(FeedSubscription::new(id, collection, rx, move || task.abort()))
    }
}

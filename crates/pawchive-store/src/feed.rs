//! Change notifications and subscription handles

use std::fmt;
use tokio::sync::mpsc;
use ulid::Ulid;

/// Events buffered per subscription before new ones are coalesced
pub const FEED_BUFFER: usize = 64;

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub Ulid);

impl SubscriptionId {
    /// Generate new subscription ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to the collection, when the feed knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
    /// Something changed (polling feeds cannot tell what)
    Unknown,
}

/// "Something changed" signal for one collection
///
/// Consumers are not expected to inspect it beyond the collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Collection that changed
    pub collection: String,
    /// Kind of change
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Create change event
    #[inline]
    pub fn new(collection: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            collection: collection.into(),
            kind,
        }
    }
}

/// Live handle on a change feed
///
/// Releases the backend listener when closed or dropped.
pub struct FeedSubscription {
    id: SubscriptionId,
    collection: String,
    events: mpsc::Receiver<ChangeEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl FeedSubscription {
    /// Wrap a receiver and the action that unregisters it
    pub fn new(
        id: SubscriptionId,
        collection: impl Into<String>,
        events: mpsc::Receiver<ChangeEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            id,
            collection: collection.into(),
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Subscription ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Collection this subscription watches
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Wait for the next event; `None` once the feed is gone
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }

    /// Unregister from the backend
    pub fn close(mut self) {
        self.release_listener();
    }

    fn release_listener(&mut self) {
        self.events.close();
        if let Some(release) = self.release.take() {
            tracing::debug!(subscription = %self.id, collection = %self.collection, "releasing change feed listener");
            release();
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.release_listener();
    }
}

impl fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("id", &self.id)
            .field("collection", &self.collection)
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn release_runs_once_on_close() {
        let released = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel(FEED_BUFFER);

        let counter = released.clone();
        let mut sub = FeedSubscription::new(SubscriptionId::new(), "strays", rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.send(ChangeEvent::new("strays", ChangeKind::Insert))
            .await
            .unwrap();
        assert_eq!(sub.recv().await.map(|e| e.kind), Some(ChangeKind::Insert));

        sub.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(tx.is_closed());
    }

    #[test]
    fn release_runs_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::channel(1);

        let counter = released.clone();
        {
            let _sub = FeedSubscription::new(SubscriptionId::new(), "strays", rx, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}

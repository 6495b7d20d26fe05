//! In-process backend
//!
//! Implements every collaborator trait against memory so that the roster can
//! run without a network:
//! - Collections keyed by name, rows in insertion order
//! - Store-assigned integer ids and `created_at` timestamps
//! - A change notification to every listener of a collection on each write
//! - Listener bookkeeping, so leaked subscriptions are observable

use crate::error::StoreError;
use crate::feed::{ChangeEvent, ChangeKind, FeedSubscription, SubscriptionId, FEED_BUFFER};
use crate::query::SelectQuery;
use crate::source::{BlobStorage, ChangeFeed, StrayMutation, StrayQuery};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use pawchive_model::{StrayDraft, StrayId, StrayRecord};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Debug)]
struct Listener {
    collection: String,
    sender: mpsc::Sender<ChangeEvent>,
}

/// Memory-backed stray store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Rows per collection, insertion order
    collections: DashMap<String, Vec<StrayRecord>>,
    /// Active change feed listeners
    listeners: Arc<DashMap<SubscriptionId, Listener>>,
    /// Uploaded objects keyed by (bucket, object)
    blobs: DashMap<(String, String), Vec<u8>>,
    /// Last assigned id
    next_id: AtomicU64,
    /// When set, selects fail with this message
    outage: Mutex<Option<String>>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows without notifying listeners
    pub fn seed(&self, collection: &str, records: impl IntoIterator<Item = StrayRecord>) {
        let mut rows = self.collections.entry(collection.to_string()).or_default();
        for record in records {
            if let Ok(n) = record.id.as_str().parse::<u64>() {
                self.next_id.fetch_max(n, Ordering::SeqCst);
            }
            rows.push(record);
        }
    }

    /// Make subsequent selects fail (`None` restores service)
    pub fn set_outage(&self, message: Option<&str>) {
        *self.outage.lock() = message.map(str::to_string);
    }

    /// Send a change event without writing anything
    pub fn touch(&self, collection: &str) {
        self.notify(collection, ChangeKind::Unknown);
    }

    /// Number of live listeners on `collection`
    #[must_use]
    pub fn listener_count(&self, collection: &str) -> usize {
        self.listeners
            .iter()
            .filter(|entry| entry.value().collection == collection)
            .count()
    }

    /// Rows currently stored in `collection`
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |rows| rows.len())
    }

    /// Whether `collection` has no rows
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Raw bytes of an uploaded object
    #[must_use]
    pub fn blob(&self, bucket: &str, object: &str) -> Option<Vec<u8>> {
        self.blobs
            .get(&(bucket.to_string(), object.to_string()))
            .map(|b| b.value().clone())
    }

    fn notify(&self, collection: &str, kind: ChangeKind) {
        let mut closed = Vec::new();
        for entry in self.listeners.iter() {
            let listener = entry.value();
            if listener.collection != collection {
                continue;
            }
            match listener
                .sender
                .try_send(ChangeEvent::new(collection, kind))
            {
                // A full buffer already holds a pending refetch trigger.
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => closed.push(*entry.key()),
            }
        }
        for id in closed {
            self.listeners.remove(&id);
        }
    }

    fn allocate_id(&self) -> StrayId {
        StrayId::from(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn apply_draft(record: &mut StrayRecord, draft: &StrayDraft) {
    record.name.clone_from(&draft.name);
    record.breed.clone_from(&draft.breed);
    record.gender.clone_from(&draft.gender);
    record.age.clone_from(&draft.age);
    record.weight.clone_from(&draft.weight);
    record.location.clone_from(&draft.location);
    record.status = draft.status.clone();
    record.rescue_date.clone_from(&draft.rescue_date);
    record.image_url.clone_from(&draft.image_url);
    record.bio.clone_from(&draft.bio);
    if let Some(vaccinations) = &draft.vaccinations {
        record.vaccinations.clone_from(vaccinations);
    }
}

/// Unknown sort columns fall back to insertion order (reversed when descending).
fn sort_rows(rows: &mut [StrayRecord], query: &SelectQuery) {
    let descending = query.order.descending;
    // Stable sorts; for descending order the input is reversed first so
    // that ties resolve newest-inserted first.
    if descending {
        rows.reverse();
    }
    match query.order.column.as_str() {
        "created_at" if descending => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        "created_at" => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        "name" if descending => rows.sort_by(|a, b| b.name.cmp(&a.name)),
        "name" => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        _ => {}
    }
}

#[async_trait]
impl StrayQuery for InMemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<StrayRecord>, StoreError> {
        if let Some(message) = self.outage.lock().clone() {
            return Err(StoreError::Unavailable(message));
        }

        let mut rows = self
            .collections
            .get(&query.collection)
            .map(|rows| rows.value().clone())
            .unwrap_or_default();

        sort_rows(&mut rows, query);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ChangeFeed for InMemoryStore {
    async fn subscribe(&self, collection: &str) -> Result<FeedSubscription, StoreError> {
        let id = SubscriptionId::new();
        let (sender, events) = mpsc::channel(FEED_BUFFER);
        self.listeners.insert(
            id,
            Listener {
                collection: collection.to_string(),
                sender,
            },
        );
        tracing::debug!(subscription = %id, collection, "in-memory listener registered");

        let listeners = Arc::clone(&self.listeners);
        Ok(FeedSubscription::new(id, collection, events, move || {
            listeners.remove(&id);
        }))
    }
}

#[async_trait]
impl StrayMutation for InMemoryStore {
    async fn insert(
        &self,
        collection: &str,
        draft: &StrayDraft,
    ) -> Result<StrayRecord, StoreError> {
        let draft = draft.clone().validate()?;
        let mut record = StrayRecord::new(self.allocate_id(), draft.name.clone())
            .with_created_at(Utc::now());
        apply_draft(&mut record, &draft);

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        self.notify(collection, ChangeKind::Insert);
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &StrayId,
        draft: &StrayDraft,
    ) -> Result<StrayRecord, StoreError> {
        let draft = draft.clone().validate()?;
        let updated = {
            let mut rows = self
                .collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let record = rows
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            apply_draft(record, &draft);
            record.clone()
        };
        self.notify(collection, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &StrayId) -> Result<(), StoreError> {
        {
            let mut rows = self
                .collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let idx = rows
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            rows.remove(idx);
        }
        self.notify(collection, ChangeKind::Delete);
        Ok(())
    }
}

#[async_trait]
impl BlobStorage for InMemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        self.blobs
            .insert((bucket.to_string(), object.to_string()), bytes);
        Ok(format!("{bucket}/{object}"))
    }

    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!("memory://{bucket}/{object}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pawchive_model::StrayStatus;
    use pretty_assertions::assert_eq;

    fn names(rows: &[StrayRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn select_orders_newest_first_and_limits() {
        let store = InMemoryStore::new();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.seed(
            "strays",
            [
                StrayRecord::new("1", "Old").with_created_at(base),
                StrayRecord::new("2", "Newest").with_created_at(base + Duration::days(2)),
                StrayRecord::new("3", "Middle").with_created_at(base + Duration::days(1)),
            ],
        );

        let all = store
            .select(&SelectQuery::newest_first("strays"))
            .await
            .unwrap();
        assert_eq!(names(&all), vec!["Newest", "Middle", "Old"]);

        let capped = store
            .select(&SelectQuery::newest_first("strays").with_limit(Some(2)))
            .await
            .unwrap();
        assert_eq!(names(&capped), vec!["Newest", "Middle"]);
    }

    #[tokio::test]
    async fn inserts_with_equal_timestamps_stay_newest_first() {
        let store = InMemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.seed(
            "strays",
            [
                StrayRecord::new("1", "First").with_created_at(at),
                StrayRecord::new("2", "Second").with_created_at(at),
            ],
        );

        let rows = store
            .select(&SelectQuery::newest_first("strays"))
            .await
            .unwrap();
        assert_eq!(names(&rows), vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn mutations_notify_listeners() {
        let store = InMemoryStore::new();
        let mut sub = store.subscribe("strays").await.unwrap();
        let mut other = store.subscribe("volunteers").await.unwrap();

        let record = store
            .insert("strays", &StrayDraft::new("Bella"))
            .await
            .unwrap();
        assert_eq!(record.id.as_str(), "1");
        assert_eq!(sub.recv().await.unwrap().kind, ChangeKind::Insert);

        store
            .update(
                "strays",
                &record.id,
                &StrayDraft::new("Bella").with_status(StrayStatus::UnderCare),
            )
            .await
            .unwrap();
        assert_eq!(sub.recv().await.unwrap().kind, ChangeKind::Update);

        store.delete("strays", &record.id).await.unwrap();
        assert_eq!(sub.recv().await.unwrap().kind, ChangeKind::Delete);

        assert!(other.try_recv().is_none());
    }

    #[tokio::test]
    async fn closing_subscription_removes_listener() {
        let store = InMemoryStore::new();
        let sub = store.subscribe("strays").await.unwrap();
        let second = store.subscribe("strays").await.unwrap();
        assert_eq!(store.listener_count("strays"), 2);

        sub.close();
        assert_eq!(store.listener_count("strays"), 1);

        drop(second);
        assert_eq!(store.listener_count("strays"), 0);
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows() {
        let store = InMemoryStore::new();
        let missing = StrayId::new("404");

        let err = store
            .update("strays", &missing, &StrayDraft::new("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.delete("strays", &missing).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn insert_rejects_invalid_draft() {
        let store = InMemoryStore::new();
        let err = store
            .insert("strays", &StrayDraft::new(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.is_empty("strays"));
    }

    #[tokio::test]
    async fn seeded_ids_are_not_reused() {
        let store = InMemoryStore::new();
        store.seed("strays", [StrayRecord::new("7", "Seeded")]);

        let record = store
            .insert("strays", &StrayDraft::new("Fresh"))
            .await
            .unwrap();
        assert_eq!(record.id.as_str(), "8");
    }

    #[tokio::test]
    async fn outage_fails_selects() {
        let store = InMemoryStore::new();
        store.set_outage(Some("maintenance"));

        let err = store
            .select(&SelectQuery::newest_first("strays"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "maintenance"));

        store.set_outage(None);
        assert!(store
            .select(&SelectQuery::newest_first("strays"))
            .await
            .is_ok());
    }
}

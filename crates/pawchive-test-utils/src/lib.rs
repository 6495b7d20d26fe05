//! Testing utilities for the pawchive workspace
//!
//! Shared fixtures and a select backend whose calls complete only when the
//! test says so.

#![allow(missing_docs)]

use async_trait::async_trait;
use pawchive_model::StrayRecord;
use pawchive_store::{SelectQuery, StoreError, StrayQuery};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How long helpers wait before declaring a test hung
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub mod fixtures {
    use chrono::{TimeZone, Utc};
    use pawchive_model::{StrayRecord, StrayStatus, VaccinationEntry};

    fn at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn charlie() -> StrayRecord {
        StrayRecord::new("1", "Charlie")
            .with_location("Central Park")
            .with_status(StrayStatus::Available)
            .with_breed("Tabby")
            .with_vaccinations(vec![
                VaccinationEntry::completed("Rabies", "2024-01-10"),
                VaccinationEntry::scheduled("FVRCP", "2024-06-01"),
            ])
            .with_created_at(at(4))
    }

    pub fn rocky() -> StrayRecord {
        StrayRecord::new("2", "Rocky")
            .with_location("City Library")
            .with_status(StrayStatus::UnderCare)
            .with_created_at(at(3))
    }

    pub fn bella() -> StrayRecord {
        StrayRecord::new("3", "Bella")
            .with_location("Riverside Dorms")
            .with_status(StrayStatus::Adopted)
            .with_image_url("https://cdn.example.com/bella.jpg")
            .with_created_at(at(2))
    }

    pub fn luna() -> StrayRecord {
        StrayRecord::new("4", "Luna")
            .with_status(StrayStatus::Available)
            .with_created_at(at(1))
    }

    /// Newest first, as a select returns them
    pub fn roster() -> Vec<StrayRecord> {
        vec![charlie(), rocky(), bella(), luna()]
    }
}

/// One select call parked until the test resolves it
#[derive(Debug)]
pub struct PendingSelect {
    /// 1-based call number
    pub call: usize,
    pub query: SelectQuery,
    reply: oneshot::Sender<Result<Vec<StrayRecord>, StoreError>>,
}

impl PendingSelect {
    pub fn resolve(self, result: Result<Vec<StrayRecord>, StoreError>) {
        let _ = self.reply.send(result);
    }

    pub fn succeed(self, records: Vec<StrayRecord>) {
        self.resolve(Ok(records));
    }

    pub fn fail(self, message: &str) {
        self.resolve(Err(StoreError::Unavailable(message.to_string())));
    }
}

/// Select backend driven by the test
///
/// Every call is handed to the test as a [`PendingSelect`] and blocks until
/// resolved, so completion order is fully controlled.
#[derive(Debug)]
pub struct ScriptedQuery {
    calls: AtomicUsize,
    pending: mpsc::UnboundedSender<PendingSelect>,
}

impl ScriptedQuery {
    pub fn new() -> (Arc<Self>, SelectQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let query = Arc::new(Self {
            calls: AtomicUsize::new(0),
            pending: tx,
        });
        (query, SelectQueue { rx })
    }

    /// Selects issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StrayQuery for ScriptedQuery {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<StrayRecord>, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let (reply, rx) = oneshot::channel();
        let pending = PendingSelect {
            call,
            query: query.clone(),
            reply,
        };
        if self.pending.send(pending).is_err() {
            return Err(StoreError::Transport("scripted queue closed".to_string()));
        }
        rx.await
            .unwrap_or_else(|_| Err(StoreError::Transport("scripted select dropped".to_string())))
    }
}

/// Receiving side of a [`ScriptedQuery`]
#[derive(Debug)]
pub struct SelectQueue {
    rx: mpsc::UnboundedReceiver<PendingSelect>,
}

impl SelectQueue {
    /// Next parked select; panics after [`TEST_TIMEOUT`]
    pub async fn next(&mut self) -> PendingSelect {
        tokio::time::timeout(TEST_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for a select")
            .expect("scripted query dropped")
    }

    /// A parked select, if one is waiting right now
    pub fn try_next(&mut self) -> Option<PendingSelect> {
        self.rx.try_recv().ok()
    }
}

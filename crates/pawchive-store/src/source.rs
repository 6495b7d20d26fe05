//! Backend collaborator traits and the shared data-access handle

use crate::config::BackendConfig;
use crate::error::StoreError;
use crate::feed::FeedSubscription;
use crate::polling::PollingFeed;
use crate::query::SelectQuery;
use crate::rest::RestBackend;
use async_trait::async_trait;
use pawchive_model::{StrayDraft, StrayId, StrayRecord};
use std::fmt;
use std::sync::Arc;

/// Full-collection reads
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StrayQuery: Send + Sync {
    /// Read the collection in the requested order
    async fn select(&self, query: &SelectQuery) -> Result<Vec<StrayRecord>, StoreError>;
}

/// Coarse change notifications
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Start listening for any insert, update or delete on `collection`
    async fn subscribe(&self, collection: &str) -> Result<FeedSubscription, StoreError>;
}

/// Single-record writes
#[async_trait]
pub trait StrayMutation: Send + Sync {
    /// Insert a stray, returning the stored row
    async fn insert(&self, collection: &str, draft: &StrayDraft)
        -> Result<StrayRecord, StoreError>;

    /// Overwrite a stray's columns, returning the stored row
    async fn update(
        &self,
        collection: &str,
        id: &StrayId,
        draft: &StrayDraft,
    ) -> Result<StrayRecord, StoreError>;

    /// Delete a stray
    async fn delete(&self, collection: &str, id: &StrayId) -> Result<(), StoreError>;
}

/// Photo bucket
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store an object, returning its bucket-relative path
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    /// Public URL of an object
    fn public_url(&self, bucket: &str, object: &str) -> String;
}

/// The data-access handle a view-model reads through
///
/// Built once at startup and passed explicitly; cloning shares the same
/// backend client.
#[derive(Clone)]
pub struct DataSource {
    /// Query side
    pub query: Arc<dyn StrayQuery>,
    /// Change feed side
    pub feed: Arc<dyn ChangeFeed>,
}

impl DataSource {
    /// Pair a query backend with a change feed
    #[inline]
    pub fn new(query: Arc<dyn StrayQuery>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self { query, feed }
    }

    /// Use one backend for both sides
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: StrayQuery + ChangeFeed + 'static,
    {
        Self {
            query: backend.clone(),
            feed: backend,
        }
    }

    /// REST backend with a polling change feed over it
    ///
    /// # Errors
    /// - `StoreError::Config` if the backend URL is missing or malformed
    pub fn rest(config: &BackendConfig) -> Result<(Self, Arc<RestBackend>), StoreError> {
        let backend = Arc::new(RestBackend::new(config)?);
        let feed = PollingFeed::new(backend.clone(), config.poll_interval());
        Ok((Self::new(backend.clone(), Arc::new(feed)), backend))
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource").finish_non_exhaustive()
    }
}

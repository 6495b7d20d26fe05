//! PawChive backend adapters
//!
//! The roster treats the backend-as-a-service as three narrow collaborators:
//!
//! - **Query**: full-collection reads, newest first ([`StrayQuery`])
//! - **Change feed**: coarse "something changed" notifications ([`ChangeFeed`])
//! - **Mutation**: inserts, updates, deletes and photo uploads
//!   ([`StrayMutation`], [`BlobStorage`])
//!
//! # Backends
//!
//! ```text
//! InMemoryStore ── query + feed + mutation + storage (tests, demos)
//! RestBackend   ── query + mutation + storage over PostgREST-style HTTP
//! PollingFeed   ── change feed over any StrayQuery (blake3 fingerprints)
//! ```
//!
//! One client is built at startup and handed around as a [`DataSource`].

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod feed;
pub mod memory;
pub mod photo;
pub mod polling;
pub mod query;
pub mod rest;
pub mod source;

pub use config::BackendConfig;
pub use error::StoreError;
pub use feed::{ChangeEvent, ChangeKind, FeedSubscription, SubscriptionId};
pub use memory::InMemoryStore;
pub use photo::upload_photo;
pub use polling::PollingFeed;
pub use query::{Order, SelectQuery};
pub use rest::RestBackend;
pub use source::{BlobStorage, ChangeFeed, DataSource, StrayMutation, StrayQuery};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Pawchive roster view-model
//!
//! Provides the live stray list behind the browse, admin and detail screens:
//! - Snapshot of the whole collection, refetched on every change event
//! - Pull-to-refresh with a distinct refreshing phase
//! - Out-of-order and post-teardown results dropped by sequence number
//! - Search and category projection, detail view and view-local favorites
//!
//! # Example
//!
//! ```no_run
//! use pawchive_roster::{Category, RosterConfig, RosterViewModel};
//! use pawchive_store::{DataSource, InMemoryStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pawchive_roster::RosterError> {
//! let store = Arc::new(InMemoryStore::new());
//! let roster = RosterViewModel::new(DataSource::from_backend(store), RosterConfig::default());
//! roster.mount().await?;
//! let shown = roster.visible("library", Category::UnderCare);
//! roster.teardown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod state;
pub mod view_model;

pub use config::RosterConfig;
pub use detail::StrayDetail;
pub use error::RosterError;
pub use favorites::FavoriteSet;
pub use filter::{apply_filter, Category};
pub use state::{FetchOutcome, LoadKind, RosterPhase, RosterState, RosterView};
pub use view_model::RosterViewModel;

/// Version of pawchive-roster
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

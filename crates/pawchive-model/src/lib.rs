//! PawChive domain model
//!
//! Types shared by every layer of the roster:
//! - `StrayRecord` and its identifier/status types
//! - Vaccination entries and the completed/total summary
//! - `StrayDraft` for inserts and updates
//! - Adoption and sponsorship request validation
//!
//! Records are produced by the backend and only ever read here. Any
//! view-local state (favorites, selection) lives outside these types.
//!
//! # Example
//!
//! ```rust
//! use pawchive_model::{StrayRecord, StrayStatus};
//!
//! let json = r#"{"id": 7, "name": "Charlie", "status": "Available", "vaccinations": null}"#;
//! let stray: StrayRecord = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(stray.id.as_str(), "7");
//! assert_eq!(stray.status, StrayStatus::Available);
//! assert_eq!(stray.vaccination_summary().to_string(), "0/0");
//! ```

#![warn(unreachable_pub)]

pub mod draft;
pub mod error;
mod lenient;
pub mod request;
pub mod stray;
pub mod vaccination;

pub use draft::StrayDraft;
pub use error::ModelError;
pub use request::{AdoptionRequest, SponsorTier, SponsorshipRequest};
pub use stray::{
    text_or_placeholder, StatusBadge, StrayId, StrayRecord, StrayStatus, PLACEHOLDER_IMAGE_URL,
    PLACEHOLDER_TEXT,
};
pub use vaccination::{VaccinationEntry, VaccinationStatus, VaccinationSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Detail screen projection of one stray

use pawchive_model::{StatusBadge, StrayRecord, VaccinationSummary};

/// Everything the detail screen renders for one stray
#[derive(Debug, Clone, PartialEq)]
pub struct StrayDetail {
    /// The record as last fetched
    pub record: StrayRecord,
    /// Photo URI with the placeholder filled in
    pub image_url: String,
    /// Status chip color
    pub badge: StatusBadge,
    /// Completed/total vaccinations
    pub vaccinations: VaccinationSummary,
    /// View-local favorite flag
    pub is_favorite: bool,
}

impl StrayDetail {
    /// Build from a snapshot record
    #[must_use]
    pub fn new(record: StrayRecord, placeholder_image_url: &str, is_favorite: bool) -> Self {
        Self {
            image_url: record.image_url_or(placeholder_image_url).to_string(),
            badge: record.status.badge(),
            vaccinations: record.vaccination_summary(),
            is_favorite,
            record,
        }
    }

    /// Labelled info rows with placeholders for missing values
    #[must_use]
    pub fn info_rows(&self) -> [(&'static str, &str); 5] {
        self.record.info_fields()
    }
}

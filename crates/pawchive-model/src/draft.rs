//! Write-side shape for inserting and updating strays

use crate::error::ModelError;
use crate::stray::{StrayRecord, StrayStatus};
use crate::vaccination::VaccinationEntry;
use serde::Serialize;

/// Column values for an insert or update
///
/// Call [`StrayDraft::validate`] before handing a draft to a backend: it
/// trims the name, rejects an empty one and drops blank optional fields.
/// A blank `bio` is written as an explicit null so that clearing it sticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrayDraft {
    /// Display name (required)
    pub name: String,
    /// Breed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Age
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Status, `Available` unless set
    pub status: StrayStatus,
    /// Rescue date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescue_date: Option<String>,
    /// Public photo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Story text, null when blank
    pub bio: Option<String>,
    /// Vaccination history (left untouched when `None`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccinations: Option<Vec<VaccinationEntry>>,
}

impl StrayDraft {
    /// Draft with a name and defaults everywhere else
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            breed: None,
            gender: None,
            age: None,
            weight: None,
            location: None,
            status: StrayStatus::Available,
            rescue_date: None,
            image_url: None,
            bio: None,
            vaccinations: None,
        }
    }

    /// With breed
    #[inline]
    #[must_use]
    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// With gender
    #[inline]
    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// With age
    #[inline]
    #[must_use]
    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    /// With weight
    #[inline]
    #[must_use]
    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    /// With location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: StrayStatus) -> Self {
        self.status = status;
        self
    }

    /// With rescue date
    #[inline]
    #[must_use]
    pub fn with_rescue_date(mut self, date: impl Into<String>) -> Self {
        self.rescue_date = Some(date.into());
        self
    }

    /// With photo URL
    #[inline]
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// With bio
    #[inline]
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// With vaccination history
    #[inline]
    #[must_use]
    pub fn with_vaccinations(mut self, vaccinations: Vec<VaccinationEntry>) -> Self {
        self.vaccinations = Some(vaccinations);
        self
    }

    /// Normalize and check required fields
    ///
    /// # Errors
    /// - `ModelError::MissingField("name")` if the trimmed name is empty
    pub fn validate(mut self) -> Result<Self, ModelError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ModelError::MissingField("name"));
        }

        for field in [
            &mut self.breed,
            &mut self.gender,
            &mut self.age,
            &mut self.weight,
            &mut self.location,
            &mut self.rescue_date,
            &mut self.image_url,
            &mut self.bio,
        ] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }

        Ok(self)
    }
}

impl From<&StrayRecord> for StrayDraft {
    /// Pre-fill an edit form with a stored row's current values
    fn from(record: &StrayRecord) -> Self {
        Self {
            name: record.name.clone(),
            breed: record.breed.clone(),
            gender: record.gender.clone(),
            age: record.age.clone(),
            weight: record.weight.clone(),
            location: record.location.clone(),
            status: record.status.clone(),
            rescue_date: record.rescue_date.clone(),
            image_url: record.image_url.clone(),
            bio: record.bio.clone(),
            vaccinations: Some(record.vaccinations.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_trims_and_requires_name() {
        assert_eq!(
            StrayDraft::new("   ").validate(),
            Err(ModelError::MissingField("name"))
        );

        let draft = StrayDraft::new("  Charlie ")
            .with_breed(" ")
            .with_location(" Engineering Building ")
            .validate()
            .unwrap();
        assert_eq!(draft.name, "Charlie");
        assert_eq!(draft.breed, None);
        assert_eq!(draft.location.as_deref(), Some("Engineering Building"));
    }

    #[test]
    fn blank_bio_serializes_as_null() {
        let draft = StrayDraft::new("Rocky").with_bio("   ").validate().unwrap();
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["bio"], serde_json::Value::Null);
        assert_eq!(json["status"], "Available");
        assert!(json.get("breed").is_none());
        assert!(json.get("vaccinations").is_none());
    }

    #[test]
    fn draft_from_record_keeps_current_values() {
        let record = StrayRecord::new("4", "Luna")
            .with_status(StrayStatus::UnderCare)
            .with_image_url("https://cdn.example/luna.jpg");
        let draft = StrayDraft::from(&record);

        assert_eq!(draft.name, "Luna");
        assert_eq!(draft.status, StrayStatus::UnderCare);
        assert_eq!(draft.image_url.as_deref(), Some("https://cdn.example/luna.jpg"));
        assert_eq!(draft.vaccinations, Some(Vec::new()));
    }
}

//! Stray records as read from the backend

use crate::lenient;
use crate::vaccination::{VaccinationEntry, VaccinationSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Image shown when a stray has no photo
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=No+Photo";

/// Text shown for absent descriptive fields
pub const PLACEHOLDER_TEXT: &str = "Unknown";

/// Field value or the placeholder text
#[inline]
#[must_use]
pub fn text_or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER_TEXT)
}

/// Store-assigned stray identifier
///
/// The backend may hand out integers or strings; both are held as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StrayId(String);

impl StrayId {
    /// Wrap an identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrayId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StrayId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for StrayId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for StrayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Roster status of a stray
///
/// Matching is exact: `Adopted` and unrecognized tags are neither
/// `Available` nor `UnderCare`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StrayStatus {
    /// Open for adoption
    #[default]
    Available,
    /// Receiving treatment or foster care
    UnderCare,
    /// Adopted
    Adopted,
    /// Unrecognized tag, kept verbatim
    Other(String),
}

impl StrayStatus {
    /// Parse a backend tag (exact match)
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Available" => Self::Available,
            "Under Care" => Self::UnderCare,
            "Adopted" => Self::Adopted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Tag as stored by the backend
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::UnderCare => "Under Care",
            Self::Adopted => "Adopted",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the stray is open for adoption
    #[inline]
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Badge styling: everything but `Available` shares the under-care style
    #[inline]
    #[must_use]
    pub fn badge(&self) -> StatusBadge {
        if self.is_available() {
            StatusBadge::Available
        } else {
            StatusBadge::UnderCare
        }
    }
}

impl fmt::Display for StrayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrayStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for StrayStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StrayStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(s)) => Self::parse(&s),
            Some(other) => Self::Other(other.to_string()),
            None => Self::default(),
        })
    }
}

/// Two-way badge style used by list and detail views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBadge {
    /// Green "available" badge
    Available,
    /// Orange badge for every other status
    UnderCare,
}

/// One animal on the roster
///
/// Created and destroyed only by the backend. Optional text fields treat
/// blanks as absent; `vaccinations` tolerates missing or malformed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrayRecord {
    /// Store-assigned identifier
    pub id: StrayId,
    /// Display name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Breed
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Gender
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Age, free text (e.g. "~2 years")
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Weight, free text
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Where on campus the stray stays
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Roster status
    #[serde(default)]
    pub status: StrayStatus,
    /// Photo URI
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Vaccination history in entry order
    #[serde(default, deserialize_with = "lenient::vaccinations")]
    pub vaccinations: Vec<VaccinationEntry>,
    /// Long-form story
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Rescue date string
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub rescue_date: Option<String>,
    /// Row creation time, the roster's ordering key
    #[serde(default, deserialize_with = "lenient::optional_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StrayRecord {
    /// Create a record with only an id and a name
    #[must_use]
    pub fn new(id: impl Into<StrayId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            breed: None,
            gender: None,
            age: None,
            weight: None,
            location: None,
            status: StrayStatus::default(),
            image_url: None,
            vaccinations: Vec::new(),
            bio: None,
            rescue_date: None,
            created_at: None,
        }
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

    /// With breed
    #[inline]
    #[must_use]
    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// With image URI
    #[inline]
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// With vaccination history
    #[inline]
    #[must_use]
    pub fn with_vaccinations(mut self, vaccinations: Vec<VaccinationEntry>) -> Self {
        self.vaccinations = vaccinations;
        self
    }

    /// With creation time
    #[inline]
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Photo URI, or `placeholder` when absent
    #[inline]
    #[must_use]
    pub fn image_url_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image_url.as_deref().unwrap_or(placeholder)
    }

    /// Photo URI, or [`PLACEHOLDER_IMAGE_URL`] when absent
    #[inline]
    #[must_use]
    pub fn display_image_url(&self) -> &str {
        self.image_url_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Completed/total over the vaccination history
    #[inline]
    #[must_use]
    pub fn vaccination_summary(&self) -> VaccinationSummary {
        VaccinationSummary::from_entries(&self.vaccinations)
    }

    /// Labelled descriptive fields with placeholders filled in
    #[must_use]
    pub fn info_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Gender", text_or_placeholder(self.gender.as_deref())),
            ("Age", text_or_placeholder(self.age.as_deref())),
            ("Weight", text_or_placeholder(self.weight.as_deref())),
            ("Rescue Date", text_or_placeholder(self.rescue_date.as_deref())),
            ("Location", text_or_placeholder(self.location.as_deref())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn id_accepts_integer_and_string() {
        let a: StrayRecord = serde_json::from_str(r#"{"id": 42, "name": "Rocky"}"#).unwrap();
        let b: StrayRecord =
            serde_json::from_str(r#"{"id": "a1b2", "name": "Bella"}"#).unwrap();
        assert_eq!(a.id.as_str(), "42");
        assert_eq!(b.id, StrayId::new("a1b2"));
    }

    #[test]
    fn missing_image_uses_placeholder() {
        let stray: StrayRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Charlie", "image_url": ""}"#).unwrap();
        assert_eq!(stray.image_url, None);
        assert_eq!(stray.display_image_url(), PLACEHOLDER_IMAGE_URL);
        assert_eq!(stray.image_url_or("file://none.png"), "file://none.png");

        let with_photo = stray.with_image_url("https://cdn.example/charlie.jpg");
        assert_eq!(with_photo.display_image_url(), "https://cdn.example/charlie.jpg");
    }

    #[test]
    fn malformed_vaccinations_are_empty() {
        for raw in [
            r#"{"id": 1, "name": "A"}"#,
            r#"{"id": 1, "name": "A", "vaccinations": null}"#,
            r#"{"id": 1, "name": "A", "vaccinations": {"name": "Rabies"}}"#,
            r#"{"id": 1, "name": "A", "vaccinations": 3}"#,
            r#"{"id": 1, "name": "A", "vaccinations": "not json"}"#,
        ] {
            let stray: StrayRecord = serde_json::from_str(raw).unwrap();
            assert!(stray.vaccinations.is_empty(), "input: {raw}");
        }
    }

    #[test]
    fn vaccinations_skip_bad_entries_and_decode_text_arrays() {
        let stray: StrayRecord = serde_json::from_str(
            r#"{"id": 1, "name": "A", "vaccinations": [{"name": "Rabies", "status": "Completed"}, 5, "x"]}"#,
        )
        .unwrap();
        assert_eq!(stray.vaccinations.len(), 1);

        let stray: StrayRecord = serde_json::from_str(
            r#"{"id": 1, "name": "A", "vaccinations": "[{\"name\": \"DHPP\", \"status\": \"Scheduled\"}]"}"#,
        )
        .unwrap();
        assert_eq!(stray.vaccination_summary().to_string(), "0/1");
    }

    #[test]
    fn mistyped_vaccination_fields_keep_the_entry() {
        let stray: StrayRecord = serde_json::from_str(
            r#"{"id": 1, "name": "A", "vaccinations": [{"date": 20240110, "status": "Completed"}, {"status": "Scheduled"}, {"status": 7}]}"#,
        )
        .unwrap();
        assert_eq!(stray.vaccinations.len(), 3);
        assert_eq!(stray.vaccination_summary().to_string(), "1/3");
    }

    #[test]
    fn null_name_does_not_reject_the_batch() {
        let rows: Vec<StrayRecord> = serde_json::from_str(
            r#"[{"id": 1, "name": "Ok"}, {"id": 2, "name": null}, {"id": 3, "name": 17}, {"id": 4}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].name, "");
        assert_eq!(rows[2].name, "17");
        assert_eq!(rows[3].name, "");

        let odd: StrayRecord = serde_json::from_str(r#"{"id": 5, "status": 2}"#).unwrap();
        assert_eq!(odd.status, StrayStatus::Other("2".to_string()));
    }

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!(StrayStatus::parse("Under Care"), StrayStatus::UnderCare);
        assert_eq!(
            StrayStatus::parse("under care"),
            StrayStatus::Other("under care".to_string())
        );
        assert_eq!(StrayStatus::Adopted.badge(), StatusBadge::UnderCare);
        assert_eq!(StrayStatus::Available.badge(), StatusBadge::Available);
    }

    #[test]
    fn missing_status_defaults_to_available() {
        let stray: StrayRecord = serde_json::from_str(r#"{"id": 1, "name": "A"}"#).unwrap();
        assert_eq!(stray.status, StrayStatus::Available);
    }

    #[test]
    fn optional_text_accepts_numbers_and_drops_blanks() {
        let stray: StrayRecord =
            serde_json::from_str(r#"{"id": 1, "name": "A", "age": 3, "breed": "  ", "weight": null}"#)
                .unwrap();
        assert_eq!(stray.age.as_deref(), Some("3"));
        assert_eq!(stray.breed, None);
        assert_eq!(stray.info_fields()[2], ("Weight", PLACEHOLDER_TEXT));
    }

    #[test]
    fn created_at_parses_postgrest_timestamps() {
        let stray: StrayRecord = serde_json::from_str(
            r#"{"id": 1, "name": "A", "created_at": "2024-03-01T08:30:00.123456+00:00"}"#,
        )
        .unwrap();
        assert!(stray.created_at.is_some());

        let bad: StrayRecord =
            serde_json::from_str(r#"{"id": 1, "name": "A", "created_at": "yesterday"}"#).unwrap();
        assert_eq!(bad.created_at, None);
    }
}

//! Vaccination records and the completed/total summary

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Vaccination status
///
/// Only `Completed` counts toward the completed total. Any value the backend
/// sends that is not one of the two known tags is kept in `Other` and
/// classified as not completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VaccinationStatus {
    /// Dose administered
    Completed,
    /// Dose booked for a later date
    #[default]
    Scheduled,
    /// Unrecognized tag, kept verbatim
    Other(String),
}

impl VaccinationStatus {
    /// Parse a backend tag (exact match)
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Completed" => Self::Completed,
            "Scheduled" => Self::Scheduled,
            other => Self::Other(other.to_string()),
        }
    }

    /// Tag as stored by the backend
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "Completed",
            Self::Scheduled => "Scheduled",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this dose counts as completed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for VaccinationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VaccinationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VaccinationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Self::parse(&s),
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        })
    }
}

/// One vaccination line on a stray's health card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaccinationEntry {
    /// Vaccine label
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub name: String,
    /// Date string as entered by staff
    #[serde(default, deserialize_with = "crate::lenient::text")]
    pub date: String,
    /// Completed or scheduled
    #[serde(default)]
    pub status: VaccinationStatus,
}

impl VaccinationEntry {
    /// Create a vaccination entry
    #[inline]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        status: VaccinationStatus,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            status,
        }
    }

    /// Completed entry
    #[inline]
    #[must_use]
    pub fn completed(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self::new(name, date, VaccinationStatus::Completed)
    }

    /// Scheduled entry
    #[inline]
    #[must_use]
    pub fn scheduled(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self::new(name, date, VaccinationStatus::Scheduled)
    }
}

/// Completed/scheduled breakdown over a vaccination list
///
/// Displays as `completed/total`, e.g. `2/3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaccinationSummary {
    /// Entries with status `Completed`
    pub completed: usize,
    /// Entries with status `Scheduled`
    pub scheduled: usize,
    /// Entries with an unrecognized status
    pub other: usize,
    /// Length of the list
    pub total: usize,
}

impl VaccinationSummary {
    /// Summarize a list of entries
    #[must_use]
    pub fn from_entries(entries: &[VaccinationEntry]) -> Self {
        entries.iter().fold(
            Self {
                total: entries.len(),
                ..Self::default()
            },
            |mut acc, entry| {
                match entry.status {
                    VaccinationStatus::Completed => acc.completed += 1,
                    VaccinationStatus::Scheduled => acc.scheduled += 1,
                    VaccinationStatus::Other(_) => acc.other += 1,
                }
                acc
            },
        )
    }

    /// Entries not yet completed
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    /// Every listed dose is completed (false for an empty list)
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl fmt::Display for VaccinationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

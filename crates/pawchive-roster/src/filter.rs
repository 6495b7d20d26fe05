//! Search and category projection over a snapshot
//!
//! Pure functions: no I/O, no state. The projection is recomputed on demand
//! and never stored.

use crate::error::RosterError;
use pawchive_model::{StrayRecord, StrayStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category chip on the browse screens
///
/// Matches `status` exactly; `Adopted` and unknown statuses only show
/// under `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// No status filter
    #[default]
    All,
    /// Status `Available`
    Available,
    /// Status `Under Care`
    UnderCare,
}

impl Category {
    /// Chips in display order
    pub const ALL: [Category; 3] = [Self::All, Self::Available, Self::UnderCare];

    /// Chip label
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Available => "Available",
            Self::UnderCare => "Under Care",
        }
    }

    /// Whether a status passes this filter
    #[inline]
    #[must_use]
    pub fn matches(self, status: &StrayStatus) -> bool {
        match self {
            Self::All => true,
            Self::Available => *status == StrayStatus::Available,
            Self::UnderCare => *status == StrayStatus::UnderCare,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "all" => Ok(Self::All),
            "available" => Ok(Self::Available),
            "undercare" => Ok(Self::UnderCare),
            _ => Err(RosterError::UnknownCategory(s.to_string())),
        }
    }
}

/// Case-insensitive substring match on name or location
///
/// `needle` must already be lowercased.
#[must_use]
pub fn matches_text(record: &StrayRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(needle)
        || record
            .location
            .as_deref()
            .is_some_and(|loc| loc.to_lowercase().contains(needle))
}

/// Records whose name or location contains `query` (ignoring case) and
/// whose status passes `category`, in snapshot order
#[must_use]
pub fn apply_filter<'a>(
    snapshot: &'a [StrayRecord],
    query: &str,
    category: Category,
) -> Vec<&'a StrayRecord> {
    let needle = query.to_lowercase();
    snapshot
        .iter()
        .filter(|record| category.matches(&record.status) && matches_text(record, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawchive_test_utils::fixtures;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(records: &[&StrayRecord]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn query_matches_location_case_insensitively() {
        let snapshot = vec![fixtures::charlie(), fixtures::rocky()];
        let result = apply_filter(&snapshot, "lib", Category::All);
        assert_eq!(names(&result), vec!["Rocky"]);
    }

    #[test]
    fn query_matches_name() {
        let snapshot = fixtures::roster();
        let result = apply_filter(&snapshot, "CHAR", Category::All);
        assert_eq!(names(&result), vec!["Charlie"]);
    }

    #[test]
    fn category_is_exact_match() {
        let snapshot = fixtures::roster();

        let available = apply_filter(&snapshot, "", Category::Available);
        assert!(available.iter().all(|r| r.status == StrayStatus::Available));

        let under_care = apply_filter(&snapshot, "", Category::UnderCare);
        assert!(under_care.iter().all(|r| r.status == StrayStatus::UnderCare));

        // Adopted strays only show under All.
        let adopted = fixtures::bella();
        assert_eq!(adopted.status, StrayStatus::Adopted);
        assert!(!names(&available).contains(&adopted.name));
        assert!(!names(&under_care).contains(&adopted.name));
        assert!(names(&apply_filter(&snapshot, "", Category::All)).contains(&adopted.name));
    }

    #[test]
    fn query_and_category_combine() {
        let snapshot = fixtures::roster();
        let result = apply_filter(&snapshot, "library", Category::Available);
        assert!(result.is_empty());

        let result = apply_filter(&snapshot, "library", Category::UnderCare);
        assert_eq!(names(&result), vec!["Rocky"]);
    }

    #[test]
    fn missing_location_only_matches_by_name() {
        let snapshot = vec![StrayRecord::new("1", "Mochi")];
        assert_eq!(apply_filter(&snapshot, "moch", Category::All).len(), 1);
        assert!(apply_filter(&snapshot, "hall", Category::All).is_empty());
    }

    #[test]
    fn category_parsing() {
        assert_eq!("Under Care".parse::<Category>().unwrap(), Category::UnderCare);
        assert_eq!("under-care".parse::<Category>().unwrap(), Category::UnderCare);
        assert_eq!("ALL".parse::<Category>().unwrap(), Category::All);
        assert!(matches!(
            "adopted".parse::<Category>(),
            Err(RosterError::UnknownCategory(_))
        ));
    }

    fn status_strategy() -> impl Strategy<Value = StrayStatus> {
        prop_oneof![
            Just(StrayStatus::Available),
            Just(StrayStatus::UnderCare),
            Just(StrayStatus::Adopted),
            "[a-z]{1,6}".prop_map(StrayStatus::Other),
        ]
    }

    fn record_strategy() -> impl Strategy<Value = StrayRecord> {
        (
            "[a-zA-Z]{1,8}",
            proptest::option::of("[a-zA-Z ]{0,12}"),
            status_strategy(),
        )
            .prop_map(|(name, location, status)| {
                let mut record = StrayRecord::new(name.clone(), name).with_status(status);
                record.location = location;
                record
            })
    }

    fn category_strategy() -> impl Strategy<Value = Category> {
        prop_oneof![
            Just(Category::All),
            Just(Category::Available),
            Just(Category::UnderCare),
        ]
    }

    proptest! {
        #[test]
        fn empty_query_under_all_is_identity(snapshot in proptest::collection::vec(record_strategy(), 0..20)) {
            let result: Vec<StrayRecord> = apply_filter(&snapshot, "", Category::All)
                .into_iter()
                .cloned()
                .collect();
            prop_assert_eq!(result, snapshot);
        }

        #[test]
        fn result_is_exactly_the_matching_subsequence(
            snapshot in proptest::collection::vec(record_strategy(), 0..20),
            query in "[a-zA-Z]{0,3}",
            category in category_strategy(),
        ) {
            let result = apply_filter(&snapshot, &query, category);
            let needle = query.to_lowercase();

            let expected: Vec<&StrayRecord> = snapshot
                .iter()
                .filter(|r| {
                    let status_ok = match category {
                        Category::All => true,
                        Category::Available => r.status == StrayStatus::Available,
                        Category::UnderCare => r.status == StrayStatus::UnderCare,
                    };
                    let text_ok = r.name.to_lowercase().contains(&needle)
                        || r.location.as_deref().is_some_and(|l| l.to_lowercase().contains(&needle));
                    status_ok && text_ok
                })
                .collect();

            prop_assert_eq!(result, expected);
        }
    }
}

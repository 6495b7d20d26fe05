//! Tolerant deserializers for loosely typed backend columns

use crate::vaccination::VaccinationEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Required text: strings are kept, numbers and booleans are stringified,
/// `null` and anything else become empty.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(scalar_text).unwrap_or_default())
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Optional free text: strings and numbers are kept, blanks and everything else become `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Vaccination list: anything that is not a sequence is empty, entries that
/// are not objects are skipped.
///
/// Object entries are always kept so the total matches what staff see;
/// mistyped fields decode leniently instead of dropping the dose.
///
/// Text columns holding a JSON array are decoded as well.
pub(crate) fn vaccinations<'de, D>(deserializer: D) -> Result<Vec<VaccinationEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(entries_from_value).unwrap_or_default())
}

fn entries_from_value(value: Value) -> Vec<VaccinationEntry> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(inner @ Value::Array(_)) => entries_from_value(inner),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Optional RFC 3339 timestamp; unparseable values become `None`.
pub(crate) fn optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    })
}

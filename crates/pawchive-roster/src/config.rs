//! Roster configuration

use pawchive_model::PLACEHOLDER_IMAGE_URL;
use pawchive_store::SelectQuery;
use serde::{Deserialize, Serialize};

/// Columns the browse, detail and admin screens read
pub const DEFAULT_FIELDS: [&str; 13] = [
    "id",
    "name",
    "breed",
    "gender",
    "age",
    "weight",
    "location",
    "status",
    "image_url",
    "vaccinations",
    "bio",
    "rescue_date",
    "created_at",
];

/// Roster view-model configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Backend collection holding the strays
    pub collection: String,
    /// Columns requested on each fetch
    pub fields: Vec<String>,
    /// Row cap per fetch (`None` = whole collection)
    pub limit: Option<usize>,
    /// Image shown for strays without a photo
    pub placeholder_image_url: String,
}

impl RosterConfig {
    /// Create config with defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With collection
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// With requested columns
    #[inline]
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// With row cap
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// With placeholder image
    #[inline]
    #[must_use]
    pub fn with_placeholder_image(mut self, url: impl Into<String>) -> Self {
        self.placeholder_image_url = url.into();
        self
    }

    /// The newest-first read issued by every fetch
    #[must_use]
    pub fn select_query(&self) -> SelectQuery {
        SelectQuery::newest_first(self.collection.clone())
            .with_fields(self.fields.iter().map(String::as_str))
            .with_limit(self.limit)
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            collection: "strays".to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            limit: None,
            placeholder_image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_query_is_newest_first_over_strays() {
        let query = RosterConfig::default().select_query();
        assert_eq!(query.collection, "strays");
        assert_eq!(query.order.to_param(), "created_at.desc");
        assert_eq!(query.limit, None);
        assert!(query.field_list().starts_with("id,name,"));
    }

    #[test]
    fn builders_flow_into_query() {
        let query = RosterConfig::new()
            .with_collection("cats")
            .with_fields(["id", "name"])
            .with_limit(Some(50))
            .select_query();
        assert_eq!(query.collection, "cats");
        assert_eq!(query.field_list(), "id,name");
        assert_eq!(query.limit, Some(50));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: RosterConfig = serde_json::from_str(r#"{"limit": 10}"#).unwrap();
        assert_eq!(config.collection, "strays");
        assert_eq!(config.limit, Some(10));
        assert_eq!(config.placeholder_image_url, PLACEHOLDER_IMAGE_URL);
    }
}

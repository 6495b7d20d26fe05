//! Read requests against a collection

use serde::{Deserialize, Serialize};

/// Sort order for a select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Column to sort by
    pub column: String,
    /// Descending when true
    pub descending: bool,
}

impl Order {
    /// Newest rows first
    #[inline]
    #[must_use]
    pub fn newest_first() -> Self {
        Self {
            column: "created_at".to_string(),
            descending: true,
        }
    }

    /// PostgREST `order=` value, e.g. `created_at.desc`
    #[must_use]
    pub fn to_param(&self) -> String {
        let dir = if self.descending { "desc" } else { "asc" };
        format!("{}.{}", self.column, dir)
    }
}

/// Unpaginated read of a whole collection
///
/// Only a static field list, one sort key and an optional cap on the number
/// of newest rows are supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Collection (table) name
    pub collection: String,
    /// Columns to return; `*` for all
    pub fields: Vec<String>,
    /// Sort order
    pub order: Order,
    /// Return at most this many rows
    pub limit: Option<usize>,
}

impl SelectQuery {
    /// All columns, newest first
    #[must_use]
    pub fn newest_first(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: vec!["*".to_string()],
            order: Order::newest_first(),
            limit: None,
        }
    }

    /// With a static field list
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        if self.fields.is_empty() {
            self.fields.push("*".to_string());
        }
        self
    }

    /// Cap to the `limit` newest rows
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Comma-joined field list, e.g. `id,name,status`
    #[must_use]
    pub fn field_list(&self) -> String {
        self.fields.join(",")
    }
}

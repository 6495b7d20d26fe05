//! View-local favorites
//!
//! Never persisted and never written back to the backend; the set lives as
//! long as the roster that owns it.

use dashmap::DashSet;
use pawchive_model::StrayId;

/// Strays the user hearted on this screen
#[derive(Debug, Default)]
pub struct FavoriteSet {
    ids: DashSet<StrayId>,
}

impl FavoriteSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the favorite flag, returning the new value
    pub fn toggle(&self, id: &StrayId) -> bool {
        if self.ids.remove(id).is_some() {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Whether `id` is a favorite
    #[must_use]
    pub fn contains(&self, id: &StrayId) -> bool {
        self.ids.contains(id)
    }

    /// Number of favorites
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget every favorite
    pub fn clear(&self) {
        self.ids.clear();
    }
}

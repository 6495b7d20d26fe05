//! Error types for the roster view-model

use pawchive_store::StoreError;

/// Roster errors
///
/// Fetch failures are not errors at this level: they become part of
/// [`RosterState`](crate::RosterState). These cover setup and input only.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Backend failure while subscribing
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Operation attempted after teardown
    #[error("roster has been torn down")]
    TornDown,

    /// Unrecognized category filter
    #[error("unknown category: '{0}' (expected all, available or under-care)")]
    UnknownCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_error_display() {
        let err = RosterError::UnknownCategory("adopted".into());
        assert!(err.to_string().contains("adopted"));

        let err: RosterError = StoreError::Transport("reset".into()).into();
        assert!(err.to_string().contains("reset"));
    }
}

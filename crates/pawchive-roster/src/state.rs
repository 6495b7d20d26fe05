//! Roster lifecycle state
//!
//! ```text
//! Idle ──fetch──▶ Loading ──ok──▶ Ready ──refresh──▶ Refreshing ──ok──▶ Ready
//!                    │                  ──change──▶ Loading              │
//!                    └──err──▶ Error ◀──────────────────────err──────────┘
//! ```

use pawchive_model::StrayRecord;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Lifecycle phase of the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPhase {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// Fetch in flight without a pull-to-refresh
    Loading,
    /// Snapshot holds the latest applied result
    Ready,
    /// User-initiated refresh in flight over a shown snapshot
    Refreshing,
    /// Latest applied fetch failed
    Error,
}

impl RosterPhase {
    /// Whether a fetch is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Refreshing)
    }
}

impl fmt::Display for RosterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Refreshing => "refreshing",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Why a fetch was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    /// First load on mount
    Initial,
    /// Change event from the feed
    Change,
    /// Pull-to-refresh
    Refresh,
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::Change => "change",
            Self::Refresh => "refresh",
        };
        f.write_str(s)
    }
}

/// What happened to one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result replaced the snapshot
    Applied {
        /// Fetch sequence number
        seq: u64,
        /// Rows in the new snapshot
        count: usize,
    },
    /// Failure was applied: snapshot cleared and error recorded
    Failed {
        /// Fetch sequence number
        seq: u64,
        /// Backend error message
        message: String,
    },
    /// A newer fetch had already been applied
    Stale {
        /// Fetch sequence number
        seq: u64,
    },
    /// The roster was torn down before the result arrived
    Discarded {
        /// Fetch sequence number (0 when never issued)
        seq: u64,
    },
}

impl FetchOutcome {
    /// Sequence number of the fetch
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::Applied { seq, .. }
            | Self::Failed { seq, .. }
            | Self::Stale { seq }
            | Self::Discarded { seq } => *seq,
        }
    }

    /// Whether this fetch changed the published state
    #[must_use]
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::Failed { .. })
    }
}

/// Published roster state
///
/// Cloning is cheap; the snapshot is shared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RosterState {
    /// Lifecycle phase
    pub phase: RosterPhase,
    /// Latest applied fetch result, newest first
    pub snapshot: Arc<Vec<StrayRecord>>,
    /// Message of the latest applied failure
    pub error: Option<String>,
    /// Sequence number of the latest applied fetch
    pub applied_seq: u64,
}

/// What a list screen should draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RosterView<'a> {
    /// Spinner, nothing to show yet
    Loading,
    /// Error panel with retry
    Error(&'a str),
    /// Loaded, no strays
    Empty,
    /// Rows, possibly with a refresh indicator
    Rows(&'a [StrayRecord]),
}

impl RosterState {
    /// Pick the view for this state
    ///
    /// A shown snapshot stays visible while a refetch is in flight.
    #[must_use]
    pub fn view(&self) -> RosterView<'_> {
        match (self.phase, self.error.as_deref()) {
            (RosterPhase::Error, Some(message)) => RosterView::Error(message),
            (RosterPhase::Error, None) => RosterView::Error(""),
            (phase, _) if self.snapshot.is_empty() => match phase {
                RosterPhase::Idle | RosterPhase::Loading | RosterPhase::Refreshing => {
                    RosterView::Loading
                }
                _ => RosterView::Empty,
            },
            _ => RosterView::Rows(&self.snapshot),
        }
    }

    /// Whether the last fetch succeeded with zero rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.view(), RosterView::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawchive_test_utils::fixtures;

    fn state(phase: RosterPhase, snapshot: Vec<StrayRecord>, error: Option<&str>) -> RosterState {
        RosterState {
            phase,
            snapshot: Arc::new(snapshot),
            error: error.map(str::to_string),
            applied_seq: 0,
        }
    }

    #[test]
    fn view_selection() {
        assert_eq!(RosterState::default().view(), RosterView::Loading);
        assert_eq!(
            state(RosterPhase::Loading, vec![], None).view(),
            RosterView::Loading
        );
        assert_eq!(
            state(RosterPhase::Error, vec![], Some("offline")).view(),
            RosterView::Error("offline")
        );
        assert!(state(RosterPhase::Ready, vec![], None).is_empty());

        let rows = fixtures::roster();
        let refreshing = state(RosterPhase::Refreshing, rows.clone(), None);
        assert_eq!(refreshing.view(), RosterView::Rows(&rows));
    }

    #[test]
    fn outcome_accessors() {
        let applied = FetchOutcome::Applied { seq: 3, count: 2 };
        assert_eq!(applied.seq(), 3);
        assert!(applied.was_applied());
        assert!(FetchOutcome::Failed { seq: 1, message: "x".into() }.was_applied());
        assert!(!FetchOutcome::Stale { seq: 2 }.was_applied());
        assert!(!FetchOutcome::Discarded { seq: 0 }.was_applied());
    }

    #[test]
    fn phase_busy() {
        assert!(RosterPhase::Loading.is_busy());
        assert!(RosterPhase::Refreshing.is_busy());
        assert!(!RosterPhase::Ready.is_busy());
        assert_eq!(RosterPhase::Refreshing.to_string(), "refreshing");
    }
}

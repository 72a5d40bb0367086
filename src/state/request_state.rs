/// Request lifecycle definitions
///
/// This module defines the states a crawl request moves through while the
/// coordinator processes it, and which transitions between them are legal.
use crate::TrawlError;
use std::fmt;

/// Represents the current state of a request in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    // ===== Active States =====
    /// Request is in the frontier waiting to be dequeued (or parked for a retry)
    Pending,

    /// The renderer is navigating to the URL
    Rendering,

    /// Load actions are running against the loaded page
    LoadActions,

    /// Crawl actions and anchor extraction are running
    LinkDiscovery,

    /// The attempt failed and the retry controller is deciding what happens next
    Failed,

    // ===== Terminal States =====
    /// A success record was emitted
    Succeeded,

    /// Retries were exhausted and an error record was emitted
    GivenUp,
}

impl RequestState {
    /// Returns true if no further processing happens after this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::GivenUp)
    }

    /// Returns true if moving from `self` to `to` is a legal transition
    pub fn can_transition_to(&self, to: RequestState) -> bool {
        use RequestState::*;

        matches!(
            (self, to),
            (Pending, Rendering)
                | (Rendering, LoadActions)
                | (Rendering, Failed)
                | (LoadActions, LinkDiscovery)
                | (LoadActions, Succeeded)
                | (LoadActions, Failed)
                | (LinkDiscovery, Succeeded)
                | (Failed, Pending)
                | (Failed, GivenUp)
        )
    }

    /// Moves to the next state, rejecting illegal transitions
    pub fn transition(self, to: RequestState) -> Result<RequestState, TrawlError> {
        if self.can_transition_to(to) {
            tracing::trace!("Request state {} -> {}", self, to);
            Ok(to)
        } else {
            Err(TrawlError::InvalidTransition { from: self, to })
        }
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::LoadActions => "load_actions",
            Self::LinkDiscovery => "link_discovery",
            Self::Failed => "failed",
            Self::Succeeded => "succeeded",
            Self::GivenUp => "given_up",
        }
    }

    /// Returns all possible request states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Rendering,
            Self::LoadActions,
            Self::LinkDiscovery,
            Self::Failed,
            Self::Succeeded,
            Self::GivenUp,
        ]
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

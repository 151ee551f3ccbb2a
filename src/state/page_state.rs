/// Page state definitions for tracking harvest progress
///
/// This module defines all possible states a catalog page can be in during a run.
use std::fmt;

/// Represents the current state of a page in the harvest process
///
/// Page objects themselves are ephemeral; they are recreated per dispatch from
/// the page number. The state is derived from the run's bookkeeping sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page has not been dispatched yet in this run
    Pending,

    /// Page is currently being fetched (a gate slot is held)
    InFlight,

    /// Page was fetched and its records handed to the sink
    Completed,

    /// Page exhausted its retry budget in the current phase
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal per-batch state
    ///
    /// After a batch barrier every dispatched page is either Completed or
    /// Failed; Pending and InFlight are only observable mid-batch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns a short lowercase name for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!PageState::Pending.is_terminal());
        assert!(!PageState::InFlight.is_terminal());

        assert!(PageState::Completed.is_terminal());
        assert!(PageState::Failed.is_terminal());
    }

    #[test]
    fn test_is_success() {
        assert!(PageState::Completed.is_success());

        assert!(!PageState::Pending.is_success());
        assert!(!PageState::InFlight.is_success());
        assert!(!PageState::Failed.is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Pending), "pending");
        assert_eq!(format!("{}", PageState::InFlight), "in_flight");
        assert_eq!(format!("{}", PageState::Completed), "completed");
        assert_eq!(format!("{}", PageState::Failed), "failed");
    }
}

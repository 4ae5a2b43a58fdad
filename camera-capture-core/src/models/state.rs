use serde::{Deserialize, Serialize};

/// Platform-reported permission to use the camera.
///
/// Moves from `Unknown` to one of the terminal values exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationState {
    #[default]
    Unknown,
    Authorized,
    Denied,
}

impl AuthorizationState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Result of session setup. Only `Success` allows further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupOutcome {
    Success,
    NotAuthorized,
    Failed,
}

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → configuring → ready(success) → running ⇄ stopped
///                    ↘ ready(failed | not-authorized)   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Idle,
    Configuring,
    Ready(SetupOutcome),
    Running,
    Stopped,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Setup ended in failure or without permission; no recovery.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ready(SetupOutcome::Failed) | Self::Ready(SetupOutcome::NotAuthorized)
        )
    }

    /// The setup outcome, once setup has finished.
    pub fn setup_outcome(&self) -> Option<SetupOutcome> {
        match self {
            Self::Idle | Self::Configuring => None,
            Self::Ready(outcome) => Some(*outcome),
            Self::Running | Self::Stopped => Some(SetupOutcome::Success),
        }
    }

    /// Whether `start_running` may take the session to `Running`.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Ready(SetupOutcome::Success) | Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SessionState::Ready(SetupOutcome::Failed).is_terminal());
        assert!(SessionState::Ready(SetupOutcome::NotAuthorized).is_terminal());
        assert!(!SessionState::Ready(SetupOutcome::Success).is_terminal());
        assert!(!SessionState::Running.is_terminal());
    }

    #[test]
    fn outcome_is_known_after_setup() {
        assert_eq!(SessionState::Configuring.setup_outcome(), None);
        assert_eq!(
            SessionState::Stopped.setup_outcome(),
            Some(SetupOutcome::Success)
        );
    }

    #[test]
    fn start_only_from_successful_setup() {
        assert!(SessionState::Ready(SetupOutcome::Success).can_start());
        assert!(SessionState::Stopped.can_start());
        assert!(!SessionState::Ready(SetupOutcome::Failed).can_start());
        assert!(!SessionState::Running.can_start());
        assert!(!SessionState::Idle.can_start());
    }
}

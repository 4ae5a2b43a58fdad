use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::models::camera::LogicalCamera;

/// Result of applying a switch on the session queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// One transaction replaced `from` with `to`.
    Switched { from: LogicalCamera, to: LogicalCamera },
    /// The target was already connected; no transaction.
    AlreadyConnected,
    /// An input was never created; the connected camera stays.
    Unavailable,
    /// Setup did not succeed; there is nothing to switch.
    NotReady,
}

/// What the caller-side half of a switch decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRequest {
    /// Same camera as the current intent.
    Unchanged,
    /// One of the two inputs is known to be missing.
    Rejected,
    /// Intent updated; a transaction must be queued.
    Enqueue { previous: LogicalCamera },
}

/// Tracks which camera the caller wants, separately from which one the
/// session has connected.
///
/// The intent changes immediately on every accepted request. Hardware
/// effects are queued behind earlier session work.
#[derive(Debug)]
pub struct InputSwitchCoordinator {
    intent: AtomicU8,
    usable: Mutex<Option<Vec<LogicalCamera>>>,
}

impl InputSwitchCoordinator {
    pub fn new(initial: LogicalCamera) -> Self {
        Self {
            intent: AtomicU8::new(initial.as_u8()),
            usable: Mutex::new(None),
        }
    }

    /// The most recently requested camera.
    pub fn current(&self) -> LogicalCamera {
        LogicalCamera::from_u8(self.intent.load(Ordering::SeqCst))
    }

    /// Whether setup has reported which inputs exist.
    pub fn is_resolved(&self) -> bool {
        self.usable.lock().is_some()
    }

    /// Record the intent to use `camera`.
    ///
    /// Before setup has resolved the inputs every change is accepted; the
    /// queued switch re-validates when it runs.
    pub fn request(&self, camera: LogicalCamera) -> SwitchRequest {
        if let Some(usable) = self.usable.lock().as_ref() {
            let current = self.current();
            if current == camera {
                return SwitchRequest::Unchanged;
            }
            if !usable.contains(&current) || !usable.contains(&camera) {
                return SwitchRequest::Rejected;
            }
        }

        let previous = LogicalCamera::from_u8(self.intent.swap(camera.as_u8(), Ordering::SeqCst));
        if previous == camera {
            SwitchRequest::Unchanged
        } else {
            SwitchRequest::Enqueue { previous }
        }
    }

    /// Called once setup finishes. An empty list rejects all later switches.
    pub(crate) fn publish_usable(&self, cameras: Vec<LogicalCamera>) {
        *self.usable.lock() = Some(cameras);
    }

    /// Point the intent at `actual` unless a newer request replaced
    /// `expected` in the meantime.
    pub(crate) fn settle(&self, expected: LogicalCamera, actual: LogicalCamera) {
        let _ = self.intent.compare_exchange(
            expected.as_u8(),
            actual.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_camera_is_unchanged() {
        let coordinator = InputSwitchCoordinator::new(LogicalCamera::Front);
        assert_eq!(coordinator.request(LogicalCamera::Front), SwitchRequest::Unchanged);

        coordinator.publish_usable(vec![LogicalCamera::Front, LogicalCamera::Back]);
        assert_eq!(coordinator.request(LogicalCamera::Front), SwitchRequest::Unchanged);
    }

    #[test]
    fn intent_updates_before_setup() {
        let coordinator = InputSwitchCoordinator::new(LogicalCamera::Front);

        assert_eq!(
            coordinator.request(LogicalCamera::Back),
            SwitchRequest::Enqueue { previous: LogicalCamera::Front }
        );
        assert_eq!(coordinator.current(), LogicalCamera::Back);
        assert!(!coordinator.is_resolved());
    }

    #[test]
    fn missing_input_rejects_after_setup() {
        let coordinator = InputSwitchCoordinator::new(LogicalCamera::Back);
        coordinator.publish_usable(vec![LogicalCamera::Back]);

        assert_eq!(coordinator.request(LogicalCamera::Front), SwitchRequest::Rejected);
        assert_eq!(coordinator.current(), LogicalCamera::Back);
    }

    #[test]
    fn failed_setup_rejects_everything() {
        let coordinator = InputSwitchCoordinator::new(LogicalCamera::Front);
        coordinator.publish_usable(Vec::new());

        assert_eq!(coordinator.request(LogicalCamera::Back), SwitchRequest::Rejected);
        assert_eq!(coordinator.current(), LogicalCamera::Front);
    }

    #[test]
    fn settle_respects_newer_intent() {
        let coordinator = InputSwitchCoordinator::new(LogicalCamera::Front);

        coordinator.settle(LogicalCamera::Front, LogicalCamera::Back);
        assert_eq!(coordinator.current(), LogicalCamera::Back);

        // Expected value no longer current: untouched.
        coordinator.settle(LogicalCamera::Front, LogicalCamera::Front);
        assert_eq!(coordinator.current(), LogicalCamera::Back);
    }
}

use crate::models::error::CameraError;
use crate::models::state::SessionState;

/// Event observer for session lifecycle notifications.
///
/// All methods are called from the session queue, not the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait SessionObserver: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called when setup fails or the session cannot start.
    fn on_error(&self, error: &CameraError);
}

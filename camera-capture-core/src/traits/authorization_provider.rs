use crate::models::state::AuthorizationState;

/// Callback receiving the user's decision (`true` = granted).
pub type AccessCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform source of camera permission.
///
/// Implemented by:
/// - `VirtualAuthorization` (camera-capture-virtual)
pub trait AuthorizationProvider: Send + Sync {
    /// Last decision known to the platform, without prompting.
    fn authorization_status(&self) -> AuthorizationState;

    /// Prompt for access.
    ///
    /// `on_resolved` fires exactly once, on a platform thread, never
    /// synchronously inside this call.
    fn request_access(&self, on_resolved: AccessCallback);
}

use std::sync::Arc;

use crate::models::camera::{CaptureDevice, DeviceInput, DeviceType, LogicalCamera, SessionPreset, VideoConnection};
use crate::models::error::CameraError;
use crate::traits::authorization_provider::AuthorizationProvider;
use crate::traits::capture_delegate::{PhotoCaptureDelegate, ResolvedPhotoSettings};

/// Interface for a platform camera stack.
///
/// Implemented by:
/// - `VirtualPlatform` (camera-capture-virtual)
pub trait CapturePlatform: Send + Sync {
    /// False on hosts without any camera hardware (simulators, test beds).
    fn has_camera_hardware(&self) -> bool;

    /// Source of camera permission for this platform.
    fn authorization_provider(&self) -> Arc<dyn AuthorizationProvider>;

    /// The physical camera at `position` with the given capability, if any.
    fn default_device(&self, position: LogicalCamera, device_type: DeviceType) -> Option<CaptureDevice>;

    /// Bind a device into a connectable input.
    fn make_device_input(&self, device: &CaptureDevice) -> Result<DeviceInput, CameraError>;

    /// Create the single hardware session.
    fn make_session(&self) -> Box<dyn SessionBackend>;
}

/// The hardware capture session and its input/output graph.
///
/// Every graph mutation must be bracketed by `begin_configuration` and
/// `commit_configuration`.
pub trait SessionBackend: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn set_preset(&mut self, preset: SessionPreset);

    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: &DeviceInput);

    fn remove_input(&mut self, input: &DeviceInput);

    fn can_add_photo_output(&self) -> bool;

    fn add_photo_output(&mut self);

    fn start_running(&mut self) -> Result<(), CameraError>;

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// The photo output's active video connection, if an input feeds it.
    fn photo_connection(&mut self) -> Option<&mut VideoConnection>;

    /// Issue a capture. The platform reports the outcome to `delegate`
    /// exactly once, off the calling thread.
    fn capture_photo(&mut self, settings: ResolvedPhotoSettings, delegate: Arc<dyn PhotoCaptureDelegate>);
}

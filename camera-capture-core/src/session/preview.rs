use parking_lot::Mutex;

use crate::models::camera::{DeviceInput, DeviceInputId, LogicalCamera};
use crate::models::orientation::{DeviceOrientation, InterfaceOrientation, VideoOrientation};

/// What the live preview currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub camera: Option<LogicalCamera>,
    pub input: Option<DeviceInputId>,
    pub running: bool,
    pub orientation: Option<VideoOrientation>,
}

/// Attach point for the rendering collaborator.
///
/// Readable from any thread. The controller rebinds it after every committed
/// configuration and every start/stop; the renderer owns the orientation.
#[derive(Debug, Default)]
pub struct PreviewLayer {
    state: Mutex<PreviewState>,
}

impl PreviewLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PreviewState {
        *self.state.lock()
    }

    pub fn connected_camera(&self) -> Option<LogicalCamera> {
        self.state.lock().camera
    }

    pub fn connected_input(&self) -> Option<DeviceInputId> {
        self.state.lock().input
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn orientation(&self) -> Option<VideoOrientation> {
        self.state.lock().orientation
    }

    pub fn set_orientation(&self, orientation: Option<VideoOrientation>) {
        self.state.lock().orientation = orientation;
    }

    /// Derive the orientation from device and interface orientation.
    pub fn update_orientation(&self, device: DeviceOrientation, interface: InterfaceOrientation) {
        self.set_orientation(Some(VideoOrientation::resolve(device, interface)));
    }

    pub(crate) fn bind_input(&self, input: Option<&DeviceInput>) {
        let mut state = self.state.lock();
        state.camera = input.map(DeviceInput::position);
        state.input = input.map(|i| i.id);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.state.lock().running = running;
    }
}

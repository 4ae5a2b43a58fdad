use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::models::camera::{CaptureDevice, DeviceInput, DeviceType, LogicalCamera};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::traits::authorization_provider::AuthorizationProvider;
use camera_capture_core::traits::capture_platform::{CapturePlatform, SessionBackend};

use crate::delivery::DeliveryThread;
use crate::device_enumerator::{DeviceEnumerator, VirtualCamera};
use crate::permissions::{AuthorizationMode, VirtualAuthorization};
use crate::session::{SessionGraph, SessionOptions, SessionProbe, VirtualSession};

const DELIVERY_THREAD_LABEL: &str = "virtual-camera-delivery";

/// Builder for [`VirtualPlatform`].
pub struct VirtualPlatformBuilder {
    devices: DeviceEnumerator,
    hardware: bool,
    authorization: AuthorizationMode,
    options: SessionOptions,
}

impl VirtualPlatformBuilder {
    /// Install `camera` at `position`, replacing any camera there.
    pub fn camera(mut self, position: LogicalCamera, camera: VirtualCamera) -> Self {
        self.devices.install(position, camera);
        self
    }

    pub fn without_camera(mut self, position: LogicalCamera) -> Self {
        self.devices.remove(position);
        self
    }

    /// A host reporting no camera hardware at all.
    pub fn no_hardware(mut self) -> Self {
        self.hardware = false;
        self
    }

    pub fn authorization(mut self, mode: AuthorizationMode) -> Self {
        self.authorization = mode;
        self
    }

    /// The session refuses the photo output.
    pub fn photo_output_unavailable(mut self) -> Self {
        self.options.photo_output_available = false;
        self
    }

    pub fn start_failure(mut self, reason: impl Into<String>) -> Self {
        self.options.start_failure = Some(reason.into());
        self
    }

    /// Size of delivered RGB frames.
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.options.frame_width = width;
        self.options.frame_height = height;
        self
    }

    /// Delay of unscripted captures.
    pub fn capture_delay(mut self, delay: Duration) -> Self {
        self.options.capture_delay = delay;
        self
    }

    pub fn build(self) -> io::Result<VirtualPlatform> {
        let delivery = Arc::new(DeliveryThread::new(DELIVERY_THREAD_LABEL)?);
        let authorization = Arc::new(VirtualAuthorization::new(self.authorization, Arc::clone(&delivery)));

        Ok(VirtualPlatform {
            devices: self.devices,
            hardware: self.hardware,
            options: self.options,
            authorization,
            graph: Arc::new(Mutex::new(SessionGraph::default())),
            delivery,
        })
    }
}

/// Scriptable in-memory camera stack.
///
/// Every session it creates shares one observable graph, reachable through
/// [`VirtualPlatform::probe`].
pub struct VirtualPlatform {
    devices: DeviceEnumerator,
    hardware: bool,
    options: SessionOptions,
    authorization: Arc<VirtualAuthorization>,
    graph: Arc<Mutex<SessionGraph>>,
    delivery: Arc<DeliveryThread>,
}

impl VirtualPlatform {
    /// Front and back cameras, access already granted, 64x48 frames
    /// delivered after 5 ms.
    pub fn builder() -> VirtualPlatformBuilder {
        VirtualPlatformBuilder {
            devices: DeviceEnumerator::standard(),
            hardware: true,
            authorization: AuthorizationMode::Authorized,
            options: SessionOptions {
                photo_output_available: true,
                start_failure: None,
                frame_width: 64,
                frame_height: 48,
                capture_delay: Duration::from_millis(5),
            },
        }
    }

    pub fn probe(&self) -> SessionProbe {
        SessionProbe::new(Arc::clone(&self.graph))
    }

    /// The permission source, for answering manual prompts.
    pub fn virtual_authorization(&self) -> Arc<VirtualAuthorization> {
        Arc::clone(&self.authorization)
    }
}

impl CapturePlatform for VirtualPlatform {
    fn has_camera_hardware(&self) -> bool {
        self.hardware
    }

    fn authorization_provider(&self) -> Arc<dyn AuthorizationProvider> {
        self.authorization.clone()
    }

    fn default_device(&self, position: LogicalCamera, device_type: DeviceType) -> Option<CaptureDevice> {
        self.devices.default_device(position, device_type)
    }

    fn make_device_input(&self, device: &CaptureDevice) -> Result<DeviceInput, CameraError> {
        self.devices.make_device_input(device)
    }

    fn make_session(&self) -> Box<dyn SessionBackend> {
        Box::new(VirtualSession::new(
            Arc::clone(&self.graph),
            self.devices.clone(),
            self.options.clone(),
            Arc::clone(&self.delivery),
        ))
    }
}

use std::collections::HashMap;

use crate::models::camera::{CaptureDevice, DeviceType, LogicalCamera};
use crate::traits::capture_platform::CapturePlatform;

/// Physical cameras discovered for each logical position.
///
/// Populated once during setup and never refreshed; accessory attach and
/// detach are not tracked.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: HashMap<LogicalCamera, CaptureDevice>,
}

impl DeviceRegistry {
    /// Ask the platform for a device of `device_type` at every position.
    pub fn discover(platform: &dyn CapturePlatform, device_type: DeviceType) -> Self {
        let mut devices = HashMap::new();
        for camera in LogicalCamera::ALL {
            match platform.default_device(camera, device_type) {
                Some(device) => {
                    log::debug!("Found {} camera: {}", camera, device.localized_name);
                    devices.insert(camera, device);
                }
                None => log::debug!("No {} camera of type {:?}", camera, device_type),
            }
        }
        Self { devices }
    }

    pub fn device(&self, camera: LogicalCamera) -> Option<&CaptureDevice> {
        self.devices.get(&camera)
    }

    /// Positions with a device, front first.
    pub fn available_cameras(&self) -> Vec<LogicalCamera> {
        LogicalCamera::ALL
            .into_iter()
            .filter(|camera| self.devices.contains_key(camera))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::camera::{DeviceInput, SessionPreset, VideoConnection};
    use crate::models::error::CameraError;
    use crate::models::state::AuthorizationState;
    use crate::traits::authorization_provider::{AccessCallback, AuthorizationProvider};
    use crate::traits::capture_delegate::{PhotoCaptureDelegate, ResolvedPhotoSettings};
    use crate::traits::capture_platform::SessionBackend;

    struct AlwaysAuthorized;

    impl AuthorizationProvider for AlwaysAuthorized {
        fn authorization_status(&self) -> AuthorizationState {
            AuthorizationState::Authorized
        }

        fn request_access(&self, on_resolved: AccessCallback) {
            std::thread::spawn(move || on_resolved(true));
        }
    }

    struct NullSession;

    impl SessionBackend for NullSession {
        fn begin_configuration(&mut self) {}
        fn commit_configuration(&mut self) {}
        fn set_preset(&mut self, _preset: SessionPreset) {}
        fn can_add_input(&self, _input: &DeviceInput) -> bool {
            false
        }
        fn add_input(&mut self, _input: &DeviceInput) {}
        fn remove_input(&mut self, _input: &DeviceInput) {}
        fn can_add_photo_output(&self) -> bool {
            false
        }
        fn add_photo_output(&mut self) {}
        fn start_running(&mut self) -> Result<(), CameraError> {
            Err(CameraError::DeviceNotAvailable)
        }
        fn stop_running(&mut self) {}
        fn is_running(&self) -> bool {
            false
        }
        fn photo_connection(&mut self) -> Option<&mut VideoConnection> {
            None
        }
        fn capture_photo(&mut self, _settings: ResolvedPhotoSettings, _delegate: Arc<dyn PhotoCaptureDelegate>) {}
    }

    /// Platform with only a back wide-angle camera.
    struct BackOnly;

    impl CapturePlatform for BackOnly {
        fn has_camera_hardware(&self) -> bool {
            true
        }

        fn authorization_provider(&self) -> Arc<dyn AuthorizationProvider> {
            Arc::new(AlwaysAuthorized)
        }

        fn default_device(&self, position: LogicalCamera, device_type: DeviceType) -> Option<CaptureDevice> {
            (position == LogicalCamera::Back && device_type == DeviceType::WideAngle).then(|| CaptureDevice {
                unique_id: "back-0".into(),
                localized_name: "Back Camera".into(),
                position,
                device_type,
            })
        }

        fn make_device_input(&self, device: &CaptureDevice) -> Result<DeviceInput, CameraError> {
            Ok(DeviceInput::new(device.clone()))
        }

        fn make_session(&self) -> Box<dyn SessionBackend> {
            Box::new(NullSession)
        }
    }

    #[test]
    fn discovers_only_present_positions() {
        let registry = DeviceRegistry::discover(&BackOnly, DeviceType::WideAngle);

        assert!(registry.device(LogicalCamera::Front).is_none());
        assert_eq!(
            registry.device(LogicalCamera::Back).map(|d| d.unique_id.as_str()),
            Some("back-0")
        );
        assert_eq!(registry.available_cameras(), vec![LogicalCamera::Back]);
    }

    #[test]
    fn capability_mismatch_finds_nothing() {
        let registry = DeviceRegistry::discover(&BackOnly, DeviceType::Telephoto);
        assert!(registry.is_empty());
        assert!(registry.available_cameras().is_empty());
    }
}

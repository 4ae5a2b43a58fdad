//! Virtual camera hardware and its enumeration.

use std::collections::HashMap;

use camera_capture_core::models::camera::{CaptureDevice, DeviceInput, DeviceType, LogicalCamera};
use camera_capture_core::models::error::CameraError;

/// One scripted physical camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCamera {
    pub name: String,
    pub device_type: DeviceType,
    /// Whether the session accepts this camera's input.
    pub addable: bool,
    /// Error returned when creating an input for this camera.
    pub input_error: Option<String>,
}

impl VirtualCamera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_type: DeviceType::WideAngle,
            addable: true,
            input_error: None,
        }
    }

    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    /// The session refuses this camera's input.
    pub fn refuse_input(mut self) -> Self {
        self.addable = false;
        self
    }

    /// Creating an input for this camera fails with `reason`.
    pub fn fail_input(mut self, reason: impl Into<String>) -> Self {
        self.input_error = Some(reason.into());
        self
    }
}

/// Cameras installed in the virtual host, one per position at most.
#[derive(Debug, Clone, Default)]
pub struct DeviceEnumerator {
    cameras: HashMap<LogicalCamera, VirtualCamera>,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A front and a back wide-angle camera.
    pub fn standard() -> Self {
        let mut enumerator = Self::new();
        enumerator.install(LogicalCamera::Front, VirtualCamera::new("Virtual Front Camera"));
        enumerator.install(LogicalCamera::Back, VirtualCamera::new("Virtual Back Camera"));
        enumerator
    }

    pub fn install(&mut self, position: LogicalCamera, camera: VirtualCamera) {
        self.cameras.insert(position, camera);
    }

    pub fn remove(&mut self, position: LogicalCamera) {
        self.cameras.remove(&position);
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// The camera at `position` if it has the requested capability.
    pub fn default_device(&self, position: LogicalCamera, device_type: DeviceType) -> Option<CaptureDevice> {
        let camera = self.cameras.get(&position)?;
        if camera.device_type != device_type {
            return None;
        }
        Some(CaptureDevice {
            unique_id: unique_id(position, device_type),
            localized_name: camera.name.clone(),
            position,
            device_type,
        })
    }

    pub fn make_device_input(&self, device: &CaptureDevice) -> Result<DeviceInput, CameraError> {
        let camera = self
            .cameras
            .get(&device.position)
            .ok_or(CameraError::DeviceNotAvailable)?;
        if let Some(ref reason) = camera.input_error {
            return Err(CameraError::InputCreationFailed(reason.clone()));
        }
        Ok(DeviceInput::new(device.clone()))
    }

    /// Whether the session accepts inputs of `device`.
    pub fn accepts(&self, device: &CaptureDevice) -> bool {
        self.cameras
            .get(&device.position)
            .is_some_and(|camera| camera.addable)
    }
}

fn unique_id(position: LogicalCamera, device_type: DeviceType) -> String {
    format!("virtual:{}:{:?}", position, device_type).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_host_has_both_cameras() {
        let enumerator = DeviceEnumerator::standard();
        for camera in LogicalCamera::ALL {
            let device = enumerator.default_device(camera, DeviceType::WideAngle).unwrap();
            assert_eq!(device.position, camera);
            assert!(enumerator.accepts(&device));
        }
    }

    #[test]
    fn device_type_must_match() {
        let enumerator = DeviceEnumerator::standard();
        assert!(enumerator
            .default_device(LogicalCamera::Back, DeviceType::Telephoto)
            .is_none());
    }

    #[test]
    fn inputs_get_fresh_identities() {
        let enumerator = DeviceEnumerator::standard();
        let device = enumerator
            .default_device(LogicalCamera::Front, DeviceType::WideAngle)
            .unwrap();
        let a = enumerator.make_device_input(&device).unwrap();
        let b = enumerator.make_device_input(&device).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn scripted_input_failure() {
        let mut enumerator = DeviceEnumerator::new();
        enumerator.install(LogicalCamera::Front, VirtualCamera::new("Broken").fail_input("busy"));
        let device = enumerator
            .default_device(LogicalCamera::Front, DeviceType::WideAngle)
            .unwrap();

        assert_eq!(
            enumerator.make_device_input(&device),
            Err(CameraError::InputCreationFailed("busy".into()))
        );
    }
}

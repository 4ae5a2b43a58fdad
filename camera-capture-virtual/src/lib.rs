//! # camera-capture-virtual
//!
//! In-memory camera backend for camera-capture-kit.
//!
//! Provides:
//! - `VirtualPlatform`: scriptable `CapturePlatform` (cameras, failures, frame size)
//! - `VirtualSession`: session graph that records every mutation and capture
//! - `VirtualAuthorization`: permission prompt answered by script or by hand
//! - `DeliveryThread`: timer thread delivering platform callbacks
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_capture_core::{CameraController, LogicalCamera};
//! use camera_capture_virtual::VirtualPlatform;
//!
//! let platform = Arc::new(VirtualPlatform::builder().build().unwrap());
//! let controller = CameraController::new(platform.clone()).unwrap();
//! controller.set_active_camera(LogicalCamera::Back);
//! controller.start_running();
//! ```

pub mod delivery;
pub mod device_enumerator;
pub mod permissions;
pub mod platform;
pub mod session;

pub use delivery::DeliveryThread;
pub use device_enumerator::{DeviceEnumerator, VirtualCamera};
pub use permissions::{AuthorizationMode, VirtualAuthorization};
pub use platform::{VirtualPlatform, VirtualPlatformBuilder};
pub use session::{CaptureScript, SessionGraph, SessionProbe, VirtualSession};

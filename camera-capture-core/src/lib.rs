//! # camera-capture-core
//!
//! Platform-agnostic camera capture session controller.
//!
//! Owns one capture session, gates it on camera authorization, switches
//! between the front and back cameras, and issues still-photo captures
//! whose results are delivered to per-request completion handlers.
//! Platform backends implement the `CapturePlatform` and `SessionBackend`
//! traits and plug into the generic `CameraController`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── controller    ← CameraController (public surface, session queue owner)
//! ├── dispatch/     ← SerialQueue (single-worker FIFO execution context)
//! ├── session/      ← AuthorizationGate, DeviceRegistry, SessionStateMachine,
//! │                   InputSwitchCoordinator, PreviewLayer
//! ├── capture/      ← CaptureRequestTracker, PhotoOutputAdapter, JPEG encoding
//! ├── traits/       ← CapturePlatform, SessionBackend, AuthorizationProvider,
//! │                   PhotoCaptureDelegate, SessionObserver, CallbackExecutor
//! └── models/       ← CameraError, SessionState, ControllerConfiguration, etc.
//! ```

pub mod capture;
pub mod controller;
pub mod dispatch;
pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::tracker::{CaptureRequestTracker, PendingRequestTable, PhotoCompletion};
pub use controller::{CameraController, CameraControllerBuilder};
pub use dispatch::serial_queue::SerialQueue;
pub use models::camera::{
    CaptureDevice, DeviceInput, DeviceInputId, DeviceType, LogicalCamera, SessionPreset, VideoConnection,
};
pub use models::config::{ControllerConfiguration, PhotoCodec, PhotoSettings, RequestId};
pub use models::error::CameraError;
pub use models::orientation::{DeviceOrientation, InterfaceOrientation, VideoOrientation};
pub use models::photo::{CapturedPhoto, PhotoMetadata, PixelFormat, RawFrame};
pub use models::state::{AuthorizationState, SessionState, SetupOutcome};
pub use session::preview::{PreviewLayer, PreviewState};
pub use traits::authorization_provider::{AccessCallback, AuthorizationProvider};
pub use traits::callback_executor::{CallbackExecutor, Job};
pub use traits::capture_delegate::{PhotoCaptureDelegate, PhotoProcessingEvent, ResolvedPhotoSettings};
pub use traits::capture_platform::{CapturePlatform, SessionBackend};
pub use traits::session_observer::SessionObserver;

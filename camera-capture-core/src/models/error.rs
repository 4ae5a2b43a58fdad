use thiserror::Error;

/// Errors that can occur while setting up or using the camera session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera access not authorized")]
    AuthorizationDenied,

    #[error("no camera input could be added to the session")]
    NoUsableInput,

    #[error("photo output could not be added to the session")]
    OutputAttachFailed,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("no camera hardware present")]
    NoCameraHardware,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("device input creation failed: {0}")]
    InputCreationFailed(String),

    #[error("session failed to start: {0}")]
    SessionStartFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl CameraError {
    /// Errors that leave the controller unusable.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied | Self::NoUsableInput | Self::OutputAttachFailed
        )
    }
}

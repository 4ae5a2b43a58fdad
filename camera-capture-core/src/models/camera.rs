use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::orientation::VideoOrientation;

/// Caller-facing camera selector, independent of any hardware handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalCamera {
    #[default]
    Front,
    Back,
}

impl LogicalCamera {
    pub const ALL: [LogicalCamera; 2] = [LogicalCamera::Front, LogicalCamera::Back];

    /// The opposite camera position.
    pub fn other(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        if value == 1 {
            Self::Back
        } else {
            Self::Front
        }
    }
}

impl fmt::Display for LogicalCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Capability class of a physical camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    #[default]
    WideAngle,
    Telephoto,
    UltraWide,
}

/// Session quality preset applied while configuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPreset {
    #[default]
    Photo,
    High,
    Medium,
    Low,
}

/// Opaque handle to a physical camera discovered by the platform.
///
/// Immutable once discovered; the registry hands out clones of the handle,
/// never new devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureDevice {
    pub unique_id: String,
    pub localized_name: String,
    pub position: LogicalCamera,
    pub device_type: DeviceType,
}

/// Identity of a connectable device input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInputId(u64);

impl DeviceInputId {
    /// Allocate a process-unique input identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceInputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input-{}", self.0)
    }
}

/// A device bound into something the session can connect.
///
/// Created once per logical camera during setup and reused across every
/// switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    pub id: DeviceInputId,
    pub device: CaptureDevice,
}

impl DeviceInput {
    pub fn new(device: CaptureDevice) -> Self {
        Self {
            id: DeviceInputId::next(),
            device,
        }
    }

    pub fn position(&self) -> LogicalCamera {
        self.device.position
    }
}

/// Per-capture properties of the photo output's active video connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConnection {
    pub orientation: VideoOrientation,
    pub automatically_adjusts_mirroring: bool,
    pub mirrored: bool,
}

impl Default for VideoConnection {
    fn default() -> Self {
        Self {
            orientation: VideoOrientation::Portrait,
            automatically_adjusts_mirroring: true,
            mirrored: false,
        }
    }
}

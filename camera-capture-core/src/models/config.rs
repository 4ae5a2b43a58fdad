use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use super::camera::{DeviceType, LogicalCamera, SessionPreset};
use super::error::CameraError;
use super::orientation::VideoOrientation;

/// Default JPEG quality for captured photos.
pub const DEFAULT_PHOTO_QUALITY: f32 = 0.9;

/// Configuration for a camera controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfiguration {
    /// Quality preset applied during setup (default: photo).
    pub session_preset: SessionPreset,

    /// Camera selected before the first switch (default: front).
    pub initial_camera: LogicalCamera,

    /// Capability class used when discovering devices (default: wide angle).
    pub device_type: DeviceType,

    /// Capture orientation when the preview has none (default: portrait).
    pub default_orientation: VideoOrientation,

    /// JPEG quality in (0, 1] for `PhotoSettings::default()` (default: 0.9).
    pub photo_quality: f32,
}

impl ControllerConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        validate_quality(self.photo_quality)
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, CameraError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CameraError::ConfigurationFailed(format!("invalid configuration: {}", e)))?;
        config.validate().map_err(CameraError::ConfigurationFailed)?;
        Ok(config)
    }

    /// Settings for one capture using this configuration's quality.
    pub fn photo_settings(&self) -> PhotoSettings {
        PhotoSettings::jpeg(self.photo_quality)
    }
}

impl Default for ControllerConfiguration {
    fn default() -> Self {
        Self {
            session_preset: SessionPreset::Photo,
            initial_camera: LogicalCamera::Front,
            device_type: DeviceType::WideAngle,
            default_orientation: VideoOrientation::Portrait,
            photo_quality: DEFAULT_PHOTO_QUALITY,
        }
    }
}

fn validate_quality(quality: f32) -> Result<(), String> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(format!("photo quality must be in (0, 1], got {}", quality));
    }
    Ok(())
}

pub(crate) fn jpeg_scale(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Process-unique identity of a photo capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(i64);

impl RequestId {
    fn next() -> Self {
        static NEXT: AtomicI64 = AtomicI64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Output codec of a photo capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCodec {
    #[default]
    Jpeg,
}

/// Settings for a single photo capture.
///
/// Each value carries its own `unique_id`, which doubles as the request ID
/// of the capture it is used for. Not `Clone`: a settings value can only be
/// consumed by one capture.
#[derive(Debug, PartialEq)]
pub struct PhotoSettings {
    unique_id: RequestId,
    codec: PhotoCodec,
    quality: f32,
}

impl PhotoSettings {
    /// JPEG settings. Quality outside (0, 1] falls back to the default.
    pub fn jpeg(quality: f32) -> Self {
        let quality = if validate_quality(quality).is_ok() {
            quality
        } else {
            log::warn!("Photo quality {} out of range, using default", quality);
            DEFAULT_PHOTO_QUALITY
        };
        Self {
            unique_id: RequestId::next(),
            codec: PhotoCodec::Jpeg,
            quality,
        }
    }

    pub fn unique_id(&self) -> RequestId {
        self.unique_id
    }

    pub fn codec(&self) -> PhotoCodec {
        self.codec
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Quality on the 1..=100 scale used by JPEG encoders.
    pub fn jpeg_quality(&self) -> u8 {
        jpeg_scale(self.quality)
    }
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self::jpeg(DEFAULT_PHOTO_QUALITY)
    }
}

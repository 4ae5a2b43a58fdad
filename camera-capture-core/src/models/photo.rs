use serde::{Deserialize, Serialize};

use super::camera::LogicalCamera;
use super::config::RequestId;
use super::orientation::VideoOrientation;

/// Pixel layout of a frame delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Packed 8-bit RGB, `width * height * 3` bytes.
    Rgb8,
    /// Already-compressed JPEG bytes.
    Jpeg,
}

/// Frame payload handed over by the platform when a photo finishes processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgb8,
            data,
        }
    }

    pub fn jpeg(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Jpeg,
            data,
        }
    }
}

/// A photo delivered to the caller of `capture_photo`.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    pub metadata: PhotoMetadata,
}

/// Metadata describing a captured photo.
///
/// Serializable for JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub id: String,
    pub request_id: RequestId,
    pub camera: LogicalCamera,
    pub orientation: VideoOrientation,
    pub mirrored: bool,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
    pub checksum: String,
    pub created_at: String,
}

impl PhotoMetadata {
    /// Metadata for freshly encoded photo bytes.
    pub fn new(
        request_id: RequestId,
        camera: LogicalCamera,
        orientation: VideoOrientation,
        width: u32,
        height: u32,
        data: &[u8],
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request_id,
            camera,
            orientation,
            mirrored: false,
            width,
            height,
            byte_len: data.len(),
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

use crate::models::camera::VideoConnection;
use crate::models::config::{jpeg_scale, PhotoCodec, RequestId};
use crate::models::error::CameraError;
use crate::models::photo::RawFrame;

/// Settings as the platform actually applied them to one capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPhotoSettings {
    pub unique_id: RequestId,
    pub codec: PhotoCodec,
    pub quality: f32,
    pub connection: VideoConnection,
}

impl ResolvedPhotoSettings {
    /// Quality on the 1..=100 scale used by JPEG encoders.
    pub fn jpeg_quality(&self) -> u8 {
        jpeg_scale(self.quality)
    }
}

/// Completion reported by the platform for one issued capture.
///
/// `Ok(None)` is a malformed success without a frame.
#[derive(Debug)]
pub struct PhotoProcessingEvent {
    pub resolved: ResolvedPhotoSettings,
    pub result: Result<Option<RawFrame>, CameraError>,
}

impl PhotoProcessingEvent {
    pub fn request_id(&self) -> RequestId {
        self.resolved.unique_id
    }
}

/// Receiver of per-capture platform events.
///
/// The platform invokes `did_finish_processing_photo` exactly once per
/// issued capture, from its own delivery thread. Completions for different
/// captures may arrive in any order.
pub trait PhotoCaptureDelegate: Send + Sync {
    fn did_finish_processing_photo(&self, event: PhotoProcessingEvent);
}

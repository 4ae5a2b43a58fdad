use crate::capture::encoding::{encode_photo, EncodedPhoto};
use crate::models::config::RequestId;
use crate::models::error::CameraError;
use crate::traits::capture_delegate::{PhotoCaptureDelegate, PhotoProcessingEvent};

/// Internal form of a capture completion.
#[derive(Debug)]
pub enum CaptureOutcome {
    Photo(EncodedPhoto),
    Failed(CameraError),
    /// Success without a frame; nothing is delivered.
    Empty,
}

#[derive(Debug)]
pub struct CaptureEvent {
    pub request_id: RequestId,
    pub outcome: CaptureOutcome,
}

/// Platform-boundary delegate shared by every capture of one controller.
///
/// Runs on the platform's delivery thread. Turns each platform event into
/// a `CaptureEvent` (encoding the frame on the way) and hands it to
/// `forward`, which posts it to the controller's session queue.
pub struct PhotoOutputAdapter<F> {
    forward: F,
}

impl<F> PhotoOutputAdapter<F>
where
    F: Fn(CaptureEvent) + Send + Sync,
{
    pub fn new(forward: F) -> Self {
        Self { forward }
    }
}

impl<F> PhotoCaptureDelegate for PhotoOutputAdapter<F>
where
    F: Fn(CaptureEvent) + Send + Sync,
{
    fn did_finish_processing_photo(&self, event: PhotoProcessingEvent) {
        let request_id = event.request_id();
        let quality = event.resolved.jpeg_quality();

        let outcome = match event.result {
            Err(e) => {
                log::error!("Capture {} failed while processing photo: {}", request_id, e);
                CaptureOutcome::Failed(as_capture_failure(e))
            }
            Ok(None) => {
                log::warn!("Capture {} finished without a frame", request_id);
                CaptureOutcome::Empty
            }
            Ok(Some(frame)) => match encode_photo(&frame, quality) {
                Ok(photo) => CaptureOutcome::Photo(photo),
                Err(e) => {
                    log::error!("Capture {} could not be encoded: {}", request_id, e);
                    CaptureOutcome::Failed(as_capture_failure(e))
                }
            },
        };

        (self.forward)(CaptureEvent { request_id, outcome });
    }
}

fn as_capture_failure(error: CameraError) -> CameraError {
    match error {
        CameraError::CaptureFailed(_) => error,
        other => CameraError::CaptureFailed(other.to_string()),
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::models::camera::LogicalCamera;
use crate::models::config::{PhotoSettings, RequestId};
use crate::models::error::CameraError;
use crate::models::orientation::VideoOrientation;
use crate::models::photo::CapturedPhoto;
use crate::traits::capture_delegate::{PhotoCaptureDelegate, ResolvedPhotoSettings};
use crate::traits::capture_platform::SessionBackend;

/// Completion handler for one capture: the photo, or why it failed.
pub type PhotoCompletion = Box<dyn FnOnce(Result<CapturedPhoto, CameraError>) + Send + 'static>;

/// One in-flight capture.
pub struct CaptureRequest {
    pub request_id: RequestId,
    pub camera: LogicalCamera,
    pub settings: ResolvedPhotoSettings,
    pub issued_at: Instant,
    handler: Option<PhotoCompletion>,
}

impl CaptureRequest {
    /// Whether the handler has been handed out for delivery.
    pub fn is_delivering(&self) -> bool {
        self.handler.is_none()
    }
}

/// Everything needed to deliver a result outside the session queue.
pub struct Delivery {
    pub request_id: RequestId,
    pub camera: LogicalCamera,
    pub orientation: VideoOrientation,
    pub handler: PhotoCompletion,
}

/// Request ID → in-flight capture.
///
/// An entry exists from just before the capture is issued until its result
/// has been delivered.
#[derive(Default)]
pub struct PendingRequestTable {
    requests: HashMap<RequestId, CaptureRequest>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.requests.contains_key(&request_id)
    }

    pub fn get(&self, request_id: RequestId) -> Option<&CaptureRequest> {
        self.requests.get(&request_id)
    }

    /// Returns false, leaving the table untouched, if the ID is taken.
    fn insert(&mut self, request: CaptureRequest) -> bool {
        if self.requests.contains_key(&request.request_id) {
            return false;
        }
        self.requests.insert(request.request_id, request);
        true
    }

    fn take_handler(&mut self, request_id: RequestId) -> Option<Delivery> {
        let request = self.requests.get_mut(&request_id)?;
        let handler = request.handler.take()?;
        Some(Delivery {
            request_id,
            camera: request.camera,
            orientation: request.settings.connection.orientation,
            handler,
        })
    }

    fn remove(&mut self, request_id: RequestId) -> Option<CaptureRequest> {
        self.requests.remove(&request_id)
    }
}

/// Issues captures and keeps the pending table for them.
///
/// Every method runs on the session queue.
#[derive(Default)]
pub struct CaptureRequestTracker {
    pending: PendingRequestTable,
}

impl CaptureRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingRequestTable {
        &self.pending
    }

    /// Configure the photo connection and issue a capture.
    ///
    /// The request is registered before the platform sees it, so a fast
    /// completion always finds its entry. Returns `None` without calling
    /// `handler` when there is no active connection.
    pub fn issue(
        &mut self,
        session: &mut dyn SessionBackend,
        camera: LogicalCamera,
        orientation: VideoOrientation,
        settings: PhotoSettings,
        handler: PhotoCompletion,
        delegate: Arc<dyn PhotoCaptureDelegate>,
    ) -> Option<RequestId> {
        let connection = {
            let Some(connection) = session.photo_connection() else {
                log::warn!("No active photo connection, dropping capture request");
                return None;
            };
            connection.orientation = orientation;
            connection.automatically_adjusts_mirroring = false;
            connection.mirrored = false;
            *connection
        };

        let request_id = settings.unique_id();
        let resolved = ResolvedPhotoSettings {
            unique_id: request_id,
            codec: settings.codec(),
            quality: settings.quality(),
            connection,
        };

        let registered = self.pending.insert(CaptureRequest {
            request_id,
            camera,
            settings: resolved,
            issued_at: Instant::now(),
            handler: Some(handler),
        });
        if !registered {
            log::error!("Capture request {} already pending, dropping duplicate", request_id);
            return None;
        }

        log::debug!("Issuing capture {} on {} camera", request_id, camera);
        session.capture_photo(resolved, delegate);
        Some(request_id)
    }

    /// Hand out the handler of `request_id`. The entry stays until
    /// `finish`; a second completion for the same ID gets `None`.
    pub fn begin_delivery(&mut self, request_id: RequestId) -> Option<Delivery> {
        let delivery = self.pending.take_handler(request_id);
        if delivery.is_none() {
            log::warn!("Completion for unknown or already delivered capture {}", request_id);
        }
        delivery
    }

    /// Remove the entry once its result has been delivered.
    pub fn finish(&mut self, request_id: RequestId) -> bool {
        match self.pending.remove(request_id) {
            Some(request) => {
                log::debug!(
                    "Capture {} resolved after {:?}",
                    request_id,
                    request.issued_at.elapsed()
                );
                true
            }
            None => false,
        }
    }

    /// Remove an entry whose completion carried nothing to deliver.
    pub fn discard(&mut self, request_id: RequestId) -> bool {
        self.pending.remove(request_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use crate::models::camera::{DeviceInput, SessionPreset, VideoConnection};
    use crate::traits::capture_delegate::PhotoProcessingEvent;

    #[derive(Default)]
    struct RecordingSession {
        connection: Option<VideoConnection>,
        issued: Vec<ResolvedPhotoSettings>,
    }

    impl SessionBackend for RecordingSession {
        fn begin_configuration(&mut self) {}
        fn commit_configuration(&mut self) {}
        fn set_preset(&mut self, _preset: SessionPreset) {}
        fn can_add_input(&self, _input: &DeviceInput) -> bool {
            true
        }
        fn add_input(&mut self, _input: &DeviceInput) {}
        fn remove_input(&mut self, _input: &DeviceInput) {}
        fn can_add_photo_output(&self) -> bool {
            true
        }
        fn add_photo_output(&mut self) {}
        fn start_running(&mut self) -> Result<(), CameraError> {
            Ok(())
        }
        fn stop_running(&mut self) {}
        fn is_running(&self) -> bool {
            true
        }
        fn photo_connection(&mut self) -> Option<&mut VideoConnection> {
            self.connection.as_mut()
        }
        fn capture_photo(&mut self, settings: ResolvedPhotoSettings, _delegate: Arc<dyn PhotoCaptureDelegate>) {
            self.issued.push(settings);
        }
    }

    struct IgnoreEvents;

    impl PhotoCaptureDelegate for IgnoreEvents {
        fn did_finish_processing_photo(&self, _event: PhotoProcessingEvent) {}
    }

    fn connected_session() -> RecordingSession {
        RecordingSession {
            connection: Some(VideoConnection {
                orientation: VideoOrientation::Portrait,
                automatically_adjusts_mirroring: true,
                mirrored: true,
            }),
            issued: Vec::new(),
        }
    }

    fn recording_handler(log: &Arc<Mutex<Vec<bool>>>) -> PhotoCompletion {
        let log = Arc::clone(log);
        Box::new(move |result| log.lock().push(result.is_ok()))
    }

    #[test]
    fn registers_before_issuing_and_forces_mirroring_off() {
        let mut session = connected_session();
        let mut tracker = CaptureRequestTracker::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let settings = PhotoSettings::default();
        let expected_id = settings.unique_id();

        let id = tracker
            .issue(
                &mut session,
                LogicalCamera::Back,
                VideoOrientation::LandscapeRight,
                settings,
                recording_handler(&calls),
                Arc::new(IgnoreEvents),
            )
            .unwrap();

        assert_eq!(id, expected_id);
        assert!(tracker.pending().contains(id));
        assert_eq!(session.issued.len(), 1);

        let connection = session.issued[0].connection;
        assert_eq!(connection.orientation, VideoOrientation::LandscapeRight);
        assert!(!connection.mirrored);
        assert!(!connection.automatically_adjusts_mirroring);
    }

    #[test]
    fn no_connection_drops_silently() {
        let mut session = RecordingSession::default();
        let mut tracker = CaptureRequestTracker::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let id = tracker.issue(
            &mut session,
            LogicalCamera::Front,
            VideoOrientation::Portrait,
            PhotoSettings::default(),
            recording_handler(&calls),
            Arc::new(IgnoreEvents),
        );

        assert!(id.is_none());
        assert!(tracker.pending().is_empty());
        assert!(session.issued.is_empty());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn handler_is_handed_out_once() {
        let mut session = connected_session();
        let mut tracker = CaptureRequestTracker::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let id = tracker
            .issue(
                &mut session,
                LogicalCamera::Front,
                VideoOrientation::Portrait,
                PhotoSettings::default(),
                recording_handler(&calls),
                Arc::new(IgnoreEvents),
            )
            .unwrap();

        let delivery = tracker.begin_delivery(id).unwrap();
        assert!(tracker.pending().get(id).unwrap().is_delivering());
        assert!(tracker.begin_delivery(id).is_none());

        (delivery.handler)(Err(CameraError::CaptureFailed("test".into())));
        assert!(tracker.finish(id));
        assert!(!tracker.finish(id));
        assert!(tracker.pending().is_empty());
        assert_eq!(*calls.lock(), vec![false]);
    }

    #[test]
    fn discard_removes_without_delivery() {
        let mut session = connected_session();
        let mut tracker = CaptureRequestTracker::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let id = tracker
            .issue(
                &mut session,
                LogicalCamera::Front,
                VideoOrientation::Portrait,
                PhotoSettings::default(),
                recording_handler(&calls),
                Arc::new(IgnoreEvents),
            )
            .unwrap();

        assert!(tracker.discard(id));
        assert!(tracker.pending().is_empty());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn unknown_completion_is_ignored() {
        let mut tracker = CaptureRequestTracker::new();
        let stray = PhotoSettings::default().unique_id();
        assert!(tracker.begin_delivery(stray).is_none());
        assert!(!tracker.finish(stray));
    }
}

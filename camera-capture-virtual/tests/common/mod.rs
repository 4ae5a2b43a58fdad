#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use camera_capture_core::{
    CameraController, CameraError, CapturedPhoto, ControllerConfiguration, PhotoSettings, RequestId, SessionObserver,
    SessionState,
};
use camera_capture_virtual::{VirtualPlatform, VirtualPlatformBuilder};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Long enough for anything that should not happen to have happened.
pub const QUIET: Duration = Duration::from_millis(150);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<SessionState>>,
    pub errors: Mutex<Vec<CameraError>>,
}

impl SessionObserver for RecordingObserver {
    fn on_state_changed(&self, state: &SessionState) {
        self.states.lock().push(*state);
    }

    fn on_error(&self, error: &CameraError) {
        self.errors.lock().push(error.clone());
    }
}

pub struct Harness {
    pub platform: Arc<VirtualPlatform>,
    pub observer: Arc<RecordingObserver>,
    pub controller: CameraController,
}

impl Harness {
    pub fn new(builder: VirtualPlatformBuilder) -> Self {
        Self::with_configuration(builder, ControllerConfiguration::default())
    }

    pub fn with_configuration(builder: VirtualPlatformBuilder, config: ControllerConfiguration) -> Self {
        init_logging();
        let platform = Arc::new(builder.build().expect("virtual platform"));
        let observer = Arc::new(RecordingObserver::default());
        let controller = CameraController::builder(platform.clone())
            .configuration(config)
            .observer(observer.clone())
            .build()
            .expect("controller");
        Self {
            platform,
            observer,
            controller,
        }
    }

    pub fn standard() -> Self {
        Self::new(VirtualPlatform::builder())
    }

    /// Harness whose session is already running.
    pub fn running() -> Self {
        let harness = Self::standard();
        harness.controller.start_running();
        harness.wait_for_state(SessionState::Running);
        harness
    }

    pub fn wait_for_state(&self, expected: SessionState) {
        assert!(
            wait_until(|| self.controller.state() == expected),
            "state {:?}, expected {:?}",
            self.controller.state(),
            expected
        );
    }

    pub fn errors(&self) -> Vec<CameraError> {
        self.observer.errors.lock().clone()
    }

    pub fn states(&self) -> Vec<SessionState> {
        self.observer.states.lock().clone()
    }

    /// Issue a capture whose result is sent to the returned receiver.
    pub fn capture(&self) -> (RequestId, mpsc::Receiver<Result<CapturedPhoto, CameraError>>) {
        let settings = PhotoSettings::default();
        let id = settings.unique_id();
        let (tx, rx) = mpsc::channel();
        self.controller.capture_photo(settings, move |result| {
            let _ = tx.send(result);
        });
        (id, rx)
    }

    pub fn wait_for_no_pending_captures(&self) {
        assert!(
            wait_until(|| self.controller.pending_capture_count() == 0),
            "{} captures still pending",
            self.controller.pending_capture_count()
        );
    }
}

pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

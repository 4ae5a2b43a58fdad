use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::capture::adapter::{CaptureEvent, CaptureOutcome, PhotoOutputAdapter};
use crate::capture::encoding::EncodedPhoto;
use crate::capture::tracker::{CaptureRequestTracker, Delivery, PhotoCompletion};
use crate::dispatch::serial_queue::SerialQueue;
use crate::models::camera::{DeviceInputId, LogicalCamera};
use crate::models::config::{ControllerConfiguration, PhotoSettings};
use crate::models::error::CameraError;
use crate::models::photo::{CapturedPhoto, PhotoMetadata};
use crate::models::state::{AuthorizationState, SessionState, SetupOutcome};
use crate::session::authorization::AuthorizationGate;
use crate::session::input_switch::{InputSwitchCoordinator, SwitchOutcome, SwitchRequest};
use crate::session::preview::PreviewLayer;
use crate::session::registry::DeviceRegistry;
use crate::session::state_machine::SessionStateMachine;
use crate::traits::callback_executor::CallbackExecutor;
use crate::traits::capture_delegate::PhotoCaptureDelegate;
use crate::traits::capture_platform::CapturePlatform;
use crate::traits::session_observer::SessionObserver;

const SESSION_QUEUE_LABEL: &str = "camera-session";
const CALLBACK_QUEUE_LABEL: &str = "camera-callbacks";

/// Everything confined to the session queue.
struct SessionCore {
    machine: SessionStateMachine,
    tracker: CaptureRequestTracker,
    registry: Option<DeviceRegistry>,
}

struct Shared {
    config: ControllerConfiguration,
    platform: Arc<dyn CapturePlatform>,
    queue: SerialQueue,
    callbacks: Arc<dyn CallbackExecutor>,
    authorization: AuthorizationGate,
    switcher: InputSwitchCoordinator,
    state: Arc<Mutex<SessionState>>,
    transactions: Arc<AtomicU64>,
    preview: Arc<PreviewLayer>,
    core: Mutex<SessionCore>,
    photo_delegate: Arc<dyn PhotoCaptureDelegate>,
}

/// Builder for [`CameraController`].
pub struct CameraControllerBuilder {
    platform: Arc<dyn CapturePlatform>,
    config: ControllerConfiguration,
    observer: Option<Arc<dyn SessionObserver>>,
    callback_executor: Option<Arc<dyn CallbackExecutor>>,
}

impl CameraControllerBuilder {
    pub fn configuration(mut self, config: ControllerConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Receives state changes and setup errors from the session queue.
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Context on which capture completions run. Defaults to a dedicated
    /// callback queue.
    pub fn callback_executor(mut self, executor: Arc<dyn CallbackExecutor>) -> Self {
        self.callback_executor = Some(executor);
        self
    }

    /// Create the controller and start setup in the background.
    ///
    /// Returns `None` on hosts without camera hardware, for an invalid
    /// configuration, or if the worker threads cannot be spawned. Setup
    /// failures are reported later through `state()` and the observer.
    pub fn build(self) -> Option<CameraController> {
        if !self.platform.has_camera_hardware() {
            log::warn!("No camera hardware present, camera controller unavailable");
            return None;
        }
        if let Err(e) = self.config.validate() {
            log::error!("Invalid camera configuration: {}", e);
            return None;
        }

        let queue = match SerialQueue::new(SESSION_QUEUE_LABEL) {
            Ok(queue) => queue,
            Err(e) => {
                log::error!("Failed to spawn camera session queue: {}", e);
                return None;
            }
        };
        let callbacks: Arc<dyn CallbackExecutor> = match self.callback_executor {
            Some(executor) => executor,
            None => match SerialQueue::new(CALLBACK_QUEUE_LABEL) {
                Ok(queue) => Arc::new(queue),
                Err(e) => {
                    log::error!("Failed to spawn camera callback queue: {}", e);
                    return None;
                }
            },
        };

        let state = Arc::new(Mutex::new(SessionState::Idle));
        let transactions = Arc::new(AtomicU64::new(0));
        let preview = Arc::new(PreviewLayer::new());
        let machine = SessionStateMachine::new(
            self.platform.make_session(),
            Arc::clone(&state),
            Arc::clone(&transactions),
            Arc::clone(&preview),
            self.observer,
        );
        let authorization =
            AuthorizationGate::new(self.platform.authorization_provider(), Arc::clone(&callbacks));
        let switcher = InputSwitchCoordinator::new(self.config.initial_camera);
        let platform = self.platform;
        let config = self.config;

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let adapter = PhotoOutputAdapter::new(move |event: CaptureEvent| match weak.upgrade() {
                Some(shared) => shared.post_capture_event(event),
                None => log::debug!(
                    "Capture {} completed after controller teardown",
                    event.request_id
                ),
            });

            Shared {
                config,
                platform,
                queue,
                callbacks,
                authorization,
                switcher,
                state,
                transactions,
                preview,
                core: Mutex::new(SessionCore {
                    machine,
                    tracker: CaptureRequestTracker::new(),
                    registry: None,
                }),
                photo_delegate: Arc::new(adapter),
            }
        });

        shared.begin_setup();
        Some(CameraController { shared })
    }
}

/// Owns one capture session and serializes every change to it.
///
/// All session mutation (setup, start/stop, input switches, capture issue
/// and request bookkeeping) runs in submission order on a single session
/// queue. Public methods only record intent and enqueue work, except the
/// diagnostic queries documented as waiting on the queue.
///
/// The waiting queries must not be called from a [`SessionObserver`]
/// callback.
pub struct CameraController {
    shared: Arc<Shared>,
}

impl CameraController {
    pub fn builder(platform: Arc<dyn CapturePlatform>) -> CameraControllerBuilder {
        CameraControllerBuilder {
            platform,
            config: ControllerConfiguration::default(),
            observer: None,
            callback_executor: None,
        }
    }

    /// Controller with the default configuration.
    pub fn new(platform: Arc<dyn CapturePlatform>) -> Option<Self> {
        Self::builder(platform).build()
    }

    pub fn configuration(&self) -> &ControllerConfiguration {
        &self.shared.config
    }

    // --- Camera selection ---

    /// The most recently selected camera. Cheap; never waits.
    pub fn current_camera(&self) -> LogicalCamera {
        self.shared.switcher.current()
    }

    /// Select `camera` and queue the input switch.
    ///
    /// Selecting the current camera does nothing. Once setup has finished,
    /// a switch to or from a camera without an input is rejected and the
    /// current camera stays selected.
    pub fn set_active_camera(&self, camera: LogicalCamera) {
        match self.shared.switcher.request(camera) {
            SwitchRequest::Unchanged => {
                log::debug!("{} camera already selected", camera);
            }
            SwitchRequest::Rejected => {
                log::warn!("Cannot switch to {} camera: input unavailable", camera);
            }
            SwitchRequest::Enqueue { previous } => {
                log::debug!("Switching camera {} → {}", previous, camera);
                self.shared.enqueue(move |shared| shared.apply_switch(camera));
            }
        }
    }

    // --- Session lifecycle ---

    /// Queue a start. No effect unless setup succeeded.
    pub fn start_running(&self) {
        self.shared.enqueue(|shared| {
            match shared.core.lock().machine.start_running() {
                Ok(true) => log::info!("Camera session running"),
                Ok(false) => log::debug!("Camera session not started"),
                // Already logged and reported by the state machine.
                Err(_) => {}
            }
        });
    }

    /// Queue a stop.
    pub fn stop_running(&self) {
        self.shared.enqueue(|shared| {
            if shared.core.lock().machine.stop_running() {
                log::info!("Camera session stopped");
            }
        });
    }

    // --- Capture ---

    /// Capture one photo and report it to `on_complete`.
    ///
    /// Dropped without calling `on_complete` when the session is not
    /// running, or when it has no active photo connection by the time the
    /// request reaches the session queue. Otherwise `on_complete` runs
    /// exactly once on the callback executor.
    pub fn capture_photo<F>(&self, settings: PhotoSettings, on_complete: F)
    where
        F: FnOnce(Result<CapturedPhoto, CameraError>) + Send + 'static,
    {
        if !self.shared.state.lock().is_running() {
            log::debug!(
                "Session not running, dropping capture request {}",
                settings.unique_id()
            );
            return;
        }

        let handler: PhotoCompletion = Box::new(on_complete);
        self.shared
            .enqueue(move |shared| shared.issue_capture(settings, handler));
    }

    // --- State ---

    pub fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    pub fn setup_outcome(&self) -> Option<SetupOutcome> {
        self.state().setup_outcome()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.shared.authorization.current_authorization()
    }

    /// Live preview bound to this session.
    pub fn preview_layer(&self) -> Arc<PreviewLayer> {
        Arc::clone(&self.shared.preview)
    }

    /// Committed configuration transactions, including setup.
    pub fn configuration_transaction_count(&self) -> u64 {
        self.shared.transactions.load(Ordering::SeqCst)
    }

    // --- Queries answered on the session queue ---

    /// Camera whose input is connected, after all queued work.
    pub fn connected_camera(&self) -> Option<LogicalCamera> {
        self.shared.query(|core| core.machine.connected_camera()).flatten()
    }

    /// Identity of the connected input, after all queued work.
    pub fn connected_input(&self) -> Option<DeviceInputId> {
        self.shared.query(|core| core.machine.connected_input()).flatten()
    }

    /// Identity of the input created for `camera` during setup.
    pub fn device_input(&self, camera: LogicalCamera) -> Option<DeviceInputId> {
        self.shared
            .query(move |core| core.machine.input(camera).map(|input| input.id))
            .flatten()
    }

    /// Positions with a discovered device. Empty before setup ran.
    pub fn available_cameras(&self) -> Vec<LogicalCamera> {
        self.shared
            .query(|core| {
                core.registry
                    .as_ref()
                    .map(DeviceRegistry::available_cameras)
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Captures issued but not yet delivered, after all queued work.
    pub fn pending_capture_count(&self) -> usize {
        self.shared
            .query(|core| core.tracker.pending().len())
            .unwrap_or(0)
    }
}

impl Shared {
    /// Run `job` on the session queue if the controller is still alive.
    fn enqueue<F>(self: &Arc<Self>, job: F)
    where
        F: FnOnce(&Arc<Shared>) + Send + 'static,
    {
        let weak = Arc::downgrade(self);
        self.queue.dispatch(move || {
            if let Some(shared) = weak.upgrade() {
                job(&shared);
            }
        });
    }

    /// Wait for all queued work, then read the core.
    fn query<F, R>(self: &Arc<Self>, f: F) -> Option<R>
    where
        F: FnOnce(&SessionCore) -> R + Send + 'static,
        R: Send + 'static,
    {
        let shared = Arc::clone(self);
        self.queue.sync(move || f(&shared.core.lock()))
    }

    fn begin_setup(self: &Arc<Self>) {
        match self.authorization.current_authorization() {
            AuthorizationState::Authorized | AuthorizationState::Denied => {}
            AuthorizationState::Unknown => {
                // Nothing on the queue may run until the user decides.
                self.queue.suspend();
                let weak = Arc::downgrade(self);
                self.authorization.request_authorization(move |_| {
                    if let Some(shared) = weak.upgrade() {
                        shared.queue.resume();
                    }
                });
            }
        }

        self.enqueue(|shared| shared.configure_session());
    }

    fn configure_session(&self) {
        let mut core = self.core.lock();

        if self.authorization.current_authorization() != AuthorizationState::Authorized {
            core.machine.mark_not_authorized();
            self.switcher.publish_usable(Vec::new());
            return;
        }

        let registry = DeviceRegistry::discover(self.platform.as_ref(), self.config.device_type);
        let preferred = self.switcher.current();

        match core.machine.configure(
            &registry,
            self.platform.as_ref(),
            preferred,
            self.config.session_preset,
        ) {
            Ok(connected) => {
                if connected != preferred {
                    self.switcher.settle(preferred, connected);
                }
                self.switcher.publish_usable(core.machine.usable_cameras());
            }
            Err(_) => self.switcher.publish_usable(Vec::new()),
        }

        core.registry = Some(registry);
    }

    fn apply_switch(&self, to: LogicalCamera) {
        let mut core = self.core.lock();
        match core.machine.switch_input(to) {
            SwitchOutcome::Switched { from, to } => {
                log::info!("Switched camera input {} → {}", from, to);
            }
            SwitchOutcome::AlreadyConnected => {
                log::debug!("{} camera already connected", to);
            }
            SwitchOutcome::Unavailable => {
                log::warn!("{} camera input unavailable, keeping current input", to);
                if let Some(connected) = core.machine.connected_camera() {
                    self.switcher.settle(to, connected);
                }
            }
            SwitchOutcome::NotReady => {
                log::debug!("Session not configured, ignoring switch to {} camera", to);
            }
        }
    }

    fn issue_capture(&self, settings: PhotoSettings, handler: PhotoCompletion) {
        let orientation = self
            .preview
            .orientation()
            .unwrap_or(self.config.default_orientation);

        let mut core = self.core.lock();
        let SessionCore {
            machine, tracker, ..
        } = &mut *core;

        if !machine.state().is_running() {
            log::debug!(
                "Session stopped before capture {} was issued, dropping",
                settings.unique_id()
            );
            return;
        }
        let Some(camera) = machine.connected_camera() else {
            log::warn!("No connected camera, dropping capture {}", settings.unique_id());
            return;
        };

        tracker.issue(
            machine.session_mut(),
            camera,
            orientation,
            settings,
            handler,
            Arc::clone(&self.photo_delegate),
        );
    }

    /// Called on the platform's delivery thread.
    fn post_capture_event(self: &Arc<Self>, event: CaptureEvent) {
        self.enqueue(move |shared| shared.handle_capture_event(event));
    }

    fn handle_capture_event(self: &Arc<Self>, event: CaptureEvent) {
        let CaptureEvent {
            request_id,
            outcome,
        } = event;

        let result = match outcome {
            CaptureOutcome::Photo(photo) => Ok(photo),
            CaptureOutcome::Failed(e) => Err(e),
            CaptureOutcome::Empty => {
                self.core.lock().tracker.discard(request_id);
                return;
            }
        };

        let Some(delivery) = self.core.lock().tracker.begin_delivery(request_id) else {
            return;
        };
        let result = result.map(|photo| captured_photo(photo, &delivery));
        let Delivery { handler, .. } = delivery;

        // The entry is only removed once the caller has seen the result.
        let weak = Arc::downgrade(self);
        self.callbacks.execute(Box::new(move || {
            handler(result);
            if let Some(shared) = weak.upgrade() {
                shared.enqueue(move |shared| {
                    shared.core.lock().tracker.finish(request_id);
                });
            }
        }));
    }
}

fn captured_photo(photo: EncodedPhoto, delivery: &Delivery) -> CapturedPhoto {
    let metadata = PhotoMetadata::new(
        delivery.request_id,
        delivery.camera,
        delivery.orientation,
        photo.width,
        photo.height,
        &photo.data,
        &photo.checksum,
    );
    CapturedPhoto {
        data: photo.data,
        metadata,
    }
}

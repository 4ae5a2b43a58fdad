use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera::{DeviceInput, DeviceInputId, LogicalCamera, SessionPreset};
use crate::models::error::CameraError;
use crate::models::state::{SessionState, SetupOutcome};
use crate::session::input_switch::SwitchOutcome;
use crate::session::preview::PreviewLayer;
use crate::session::registry::DeviceRegistry;
use crate::traits::capture_platform::{CapturePlatform, SessionBackend};
use crate::traits::session_observer::SessionObserver;

/// Begin/commit bracket around session graph mutation.
///
/// Commits when dropped, including on early return.
pub struct ConfigurationTransaction<'a> {
    session: &'a mut dyn SessionBackend,
    committed: &'a AtomicU64,
}

impl<'a> ConfigurationTransaction<'a> {
    fn begin(session: &'a mut dyn SessionBackend, committed: &'a AtomicU64) -> Self {
        session.begin_configuration();
        Self { session, committed }
    }
}

impl<'a> Deref for ConfigurationTransaction<'a> {
    type Target = dyn SessionBackend + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.session
    }
}

impl<'a> DerefMut for ConfigurationTransaction<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.session
    }
}

impl Drop for ConfigurationTransaction<'_> {
    fn drop(&mut self) {
        self.session.commit_configuration();
        self.committed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owner of the hardware session and its lifecycle.
///
/// Lives on the controller's session queue; nothing here is touched from
/// any other thread. State changes are published to a shared snapshot and
/// to the optional observer.
pub struct SessionStateMachine {
    session: Box<dyn SessionBackend>,
    state: SessionState,
    inputs: HashMap<LogicalCamera, DeviceInput>,
    connected: Option<LogicalCamera>,
    transactions: Arc<AtomicU64>,
    published: Arc<Mutex<SessionState>>,
    preview: Arc<PreviewLayer>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl SessionStateMachine {
    pub fn new(
        session: Box<dyn SessionBackend>,
        published: Arc<Mutex<SessionState>>,
        transactions: Arc<AtomicU64>,
        preview: Arc<PreviewLayer>,
        observer: Option<Arc<dyn SessionObserver>>,
    ) -> Self {
        *published.lock() = SessionState::Idle;
        Self {
            session,
            state: SessionState::Idle,
            inputs: HashMap::new(),
            connected: None,
            transactions,
            published,
            preview,
            observer,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Committed configuration transactions so far.
    pub fn transaction_count(&self) -> u64 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Positions whose input was created and accepted during setup.
    pub fn usable_cameras(&self) -> Vec<LogicalCamera> {
        LogicalCamera::ALL
            .into_iter()
            .filter(|camera| self.inputs.contains_key(camera))
            .collect()
    }

    pub fn input(&self, camera: LogicalCamera) -> Option<&DeviceInput> {
        self.inputs.get(&camera)
    }

    pub fn connected_camera(&self) -> Option<LogicalCamera> {
        self.connected
    }

    pub fn connected_input(&self) -> Option<DeviceInputId> {
        self.connected
            .and_then(|camera| self.inputs.get(&camera))
            .map(|input| input.id)
    }

    /// Direct access for issuing captures; graph mutation must go through
    /// a transaction instead.
    pub fn session_mut(&mut self) -> &mut dyn SessionBackend {
        &mut *self.session
    }

    /// Authorization was refused; setup never runs.
    pub fn mark_not_authorized(&mut self) {
        log::error!("Camera access not authorized, session will not be configured");
        self.set_state(SessionState::Ready(SetupOutcome::NotAuthorized));
        self.report(&CameraError::AuthorizationDenied);
    }

    /// Configure inputs and the photo output.
    ///
    /// Transitions: idle → configuring → ready(success | failed). Returns the
    /// camera actually connected, which is `preferred` unless only the other
    /// camera is usable.
    pub fn configure(
        &mut self,
        registry: &DeviceRegistry,
        platform: &dyn CapturePlatform,
        preferred: LogicalCamera,
        preset: SessionPreset,
    ) -> Result<LogicalCamera, CameraError> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(CameraError::ConfigurationFailed(
                "can only configure from idle state".into(),
            ));
        }

        self.set_state(SessionState::Configuring);

        match self.build_graph(registry, platform, preferred, preset) {
            Ok(camera) => {
                self.preview.bind_input(self.inputs.get(&camera));
                self.set_state(SessionState::Ready(SetupOutcome::Success));
                log::info!("Camera session configured with {} camera", camera);
                Ok(camera)
            }
            Err(e) => {
                log::error!("Camera session setup failed: {}", e);
                self.set_state(SessionState::Ready(SetupOutcome::Failed));
                self.report(&e);
                Err(e)
            }
        }
    }

    fn build_graph(
        &mut self,
        registry: &DeviceRegistry,
        platform: &dyn CapturePlatform,
        preferred: LogicalCamera,
        preset: SessionPreset,
    ) -> Result<LogicalCamera, CameraError> {
        let mut transaction = ConfigurationTransaction::begin(&mut *self.session, &self.transactions);
        transaction.set_preset(preset);

        for camera in LogicalCamera::ALL {
            let Some(device) = registry.device(camera) else {
                continue;
            };
            let input = match platform.make_device_input(device) {
                Ok(input) => input,
                Err(e) => {
                    log::warn!("Could not create {} camera input: {}", camera, e);
                    continue;
                }
            };
            if transaction.can_add_input(&input) {
                self.inputs.insert(camera, input);
            } else {
                log::warn!("Session refused {} camera input", camera);
            }
        }

        // At least one functional input is required.
        let camera = if self.inputs.contains_key(&preferred) {
            preferred
        } else if self.inputs.contains_key(&preferred.other()) {
            log::warn!(
                "{} camera unavailable, connecting {} camera instead",
                preferred,
                preferred.other()
            );
            preferred.other()
        } else {
            return Err(CameraError::NoUsableInput);
        };

        if let Some(input) = self.inputs.get(&camera) {
            transaction.add_input(input);
            self.connected = Some(camera);
        }

        if !transaction.can_add_photo_output() {
            return Err(CameraError::OutputAttachFailed);
        }
        transaction.add_photo_output();

        Ok(camera)
    }

    /// Replace the connected input with the one for `to` in a single
    /// transaction.
    ///
    /// Skips the transaction when `to` is already connected, and refuses
    /// when either input is missing so the session never loses its only
    /// input.
    pub fn switch_input(&mut self, to: LogicalCamera) -> SwitchOutcome {
        if self.state.setup_outcome() != Some(SetupOutcome::Success) {
            return SwitchOutcome::NotReady;
        }
        let Some(from) = self.connected else {
            return SwitchOutcome::NotReady;
        };
        if from == to {
            return SwitchOutcome::AlreadyConnected;
        }
        let (Some(remove), Some(add)) = (self.inputs.get(&from), self.inputs.get(&to)) else {
            return SwitchOutcome::Unavailable;
        };

        {
            let mut transaction =
                ConfigurationTransaction::begin(&mut *self.session, &self.transactions);
            transaction.remove_input(remove);
            transaction.add_input(add);
        }

        self.connected = Some(to);
        self.preview.bind_input(Some(add));
        SwitchOutcome::Switched { from, to }
    }

    /// Transitions: ready(success) | stopped → running.
    ///
    /// Returns `Ok(false)` when the session cannot start from its current
    /// state.
    pub fn start_running(&mut self) -> Result<bool, CameraError> {
        if !self.state.can_start() {
            log::debug!("Ignoring start request in state {:?}", self.state);
            return Ok(false);
        }

        if let Err(e) = self.session.start_running() {
            log::error!("Camera session failed to start: {}", e);
            self.report(&e);
            return Err(e);
        }

        self.preview.set_running(true);
        self.set_state(SessionState::Running);
        Ok(true)
    }

    /// Transitions: running → stopped.
    pub fn stop_running(&mut self) -> bool {
        if !self.state.is_running() {
            log::debug!("Ignoring stop request in state {:?}", self.state);
            return false;
        }

        self.session.stop_running();
        self.preview.set_running(false);
        self.set_state(SessionState::Stopped);
        true
    }

    fn set_state(&mut self, new_state: SessionState) {
        self.state = new_state;
        *self.published.lock() = new_state;
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(&new_state);
        }
    }

    fn report(&self, error: &CameraError) {
        if let Some(ref observer) = self.observer {
            observer.on_error(error);
        }
    }
}

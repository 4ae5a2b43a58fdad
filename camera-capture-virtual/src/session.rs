//! In-memory capture session.
//!
//! Keeps the input/output graph in a shared [`SessionGraph`] so tests can
//! observe it through a [`SessionProbe`] while the controller owns the
//! session itself.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::models::camera::{DeviceInput, DeviceInputId, LogicalCamera, SessionPreset, VideoConnection};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::photo::RawFrame;
use camera_capture_core::traits::capture_delegate::{PhotoCaptureDelegate, PhotoProcessingEvent, ResolvedPhotoSettings};
use camera_capture_core::traits::capture_platform::SessionBackend;

use crate::delivery::DeliveryThread;
use crate::device_enumerator::DeviceEnumerator;

/// Scripted outcome of one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureScript {
    /// Deliver a frame after `delay`.
    Succeed { delay: Duration },
    /// Report `reason` after `delay`.
    Fail { reason: String, delay: Duration },
    /// Report success without a frame after `delay`.
    Empty { delay: Duration },
}

impl CaptureScript {
    fn delay(&self) -> Duration {
        match self {
            Self::Succeed { delay } | Self::Fail { delay, .. } | Self::Empty { delay } => *delay,
        }
    }
}

/// Behavior knobs shared by the platform and its session.
#[derive(Debug, Clone)]
pub(crate) struct SessionOptions {
    pub photo_output_available: bool,
    pub start_failure: Option<String>,
    pub frame_width: u32,
    pub frame_height: u32,
    pub capture_delay: Duration,
}

/// Observable state of the virtual session graph.
#[derive(Debug, Default)]
pub struct SessionGraph {
    inputs: Vec<DeviceInput>,
    photo_output: bool,
    running: bool,
    preset: Option<SessionPreset>,
    configuring: bool,
    commits: u64,
    unbracketed_mutations: u64,
    issued: Vec<ResolvedPhotoSettings>,
    scripts: VecDeque<CaptureScript>,
}

impl SessionGraph {
    fn mutate(&mut self, what: &str) {
        if !self.configuring {
            log::error!("Session graph mutated outside a configuration: {}", what);
            self.unbracketed_mutations += 1;
        }
    }
}

/// Read-only view of a session graph.
#[derive(Clone)]
pub struct SessionProbe {
    graph: Arc<Mutex<SessionGraph>>,
}

impl SessionProbe {
    pub(crate) fn new(graph: Arc<Mutex<SessionGraph>>) -> Self {
        Self { graph }
    }

    pub fn input_ids(&self) -> Vec<DeviceInputId> {
        self.graph.lock().inputs.iter().map(|input| input.id).collect()
    }

    pub fn connected_positions(&self) -> Vec<LogicalCamera> {
        self.graph.lock().inputs.iter().map(|input| input.position()).collect()
    }

    pub fn has_photo_output(&self) -> bool {
        self.graph.lock().photo_output
    }

    pub fn is_running(&self) -> bool {
        self.graph.lock().running
    }

    pub fn preset(&self) -> Option<SessionPreset> {
        self.graph.lock().preset
    }

    pub fn is_configuring(&self) -> bool {
        self.graph.lock().configuring
    }

    /// Committed configurations.
    pub fn commits(&self) -> u64 {
        self.graph.lock().commits
    }

    /// Graph changes made without `begin_configuration`.
    pub fn unbracketed_mutations(&self) -> u64 {
        self.graph.lock().unbracketed_mutations
    }

    /// Settings of every capture issued, in issue order.
    pub fn issued_captures(&self) -> Vec<ResolvedPhotoSettings> {
        self.graph.lock().issued.clone()
    }

    /// Queue the outcome of a future capture. Unscripted captures succeed.
    pub fn script_capture(&self, script: CaptureScript) {
        self.graph.lock().scripts.push_back(script);
    }
}

pub struct VirtualSession {
    graph: Arc<Mutex<SessionGraph>>,
    devices: DeviceEnumerator,
    options: SessionOptions,
    connection: VideoConnection,
    delivery: Arc<DeliveryThread>,
}

impl VirtualSession {
    pub(crate) fn new(
        graph: Arc<Mutex<SessionGraph>>,
        devices: DeviceEnumerator,
        options: SessionOptions,
        delivery: Arc<DeliveryThread>,
    ) -> Self {
        Self {
            graph,
            devices,
            options,
            connection: VideoConnection::default(),
            delivery,
        }
    }

    fn frame(&self) -> RawFrame {
        let (width, height) = (self.options.frame_width, self.options.frame_height);
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 0x80]);
            }
        }
        RawFrame::rgb8(width, height, data)
    }
}

impl SessionBackend for VirtualSession {
    fn begin_configuration(&mut self) {
        let mut graph = self.graph.lock();
        if graph.configuring {
            log::warn!("Nested session configuration");
        }
        graph.configuring = true;
    }

    fn commit_configuration(&mut self) {
        let mut graph = self.graph.lock();
        graph.configuring = false;
        graph.commits += 1;
    }

    fn set_preset(&mut self, preset: SessionPreset) {
        let mut graph = self.graph.lock();
        graph.mutate("set preset");
        graph.preset = Some(preset);
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        let graph = self.graph.lock();
        self.devices.accepts(&input.device) && !graph.inputs.iter().any(|i| i.id == input.id)
    }

    fn add_input(&mut self, input: &DeviceInput) {
        let mut graph = self.graph.lock();
        graph.mutate("add input");
        graph.inputs.push(input.clone());
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        let mut graph = self.graph.lock();
        graph.mutate("remove input");
        graph.inputs.retain(|i| i.id != input.id);
    }

    fn can_add_photo_output(&self) -> bool {
        self.options.photo_output_available && !self.graph.lock().photo_output
    }

    fn add_photo_output(&mut self) {
        let mut graph = self.graph.lock();
        graph.mutate("add photo output");
        graph.photo_output = true;
    }

    fn start_running(&mut self) -> Result<(), CameraError> {
        if let Some(ref reason) = self.options.start_failure {
            return Err(CameraError::SessionStartFailed(reason.clone()));
        }
        self.graph.lock().running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        self.graph.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.graph.lock().running
    }

    fn photo_connection(&mut self) -> Option<&mut VideoConnection> {
        let active = {
            let graph = self.graph.lock();
            graph.photo_output && !graph.inputs.is_empty()
        };
        if active {
            Some(&mut self.connection)
        } else {
            None
        }
    }

    fn capture_photo(&mut self, settings: ResolvedPhotoSettings, delegate: Arc<dyn PhotoCaptureDelegate>) {
        let (script, running) = {
            let mut graph = self.graph.lock();
            graph.issued.push(settings);
            let script = graph.scripts.pop_front().unwrap_or(CaptureScript::Succeed {
                delay: self.options.capture_delay,
            });
            (script, graph.running)
        };

        let result = if !running {
            Err(CameraError::CaptureFailed("session is not running".into()))
        } else {
            match script {
                CaptureScript::Succeed { .. } => Ok(Some(self.frame())),
                CaptureScript::Fail { ref reason, .. } => Err(CameraError::CaptureFailed(reason.clone())),
                CaptureScript::Empty { .. } => Ok(None),
            }
        };

        log::debug!("Virtual capture {} completes in {:?}", settings.unique_id, script.delay());
        self.delivery.schedule(
            script.delay(),
            Box::new(move || {
                delegate.did_finish_processing_photo(PhotoProcessingEvent {
                    resolved: settings,
                    result,
                });
            }),
        );
    }
}

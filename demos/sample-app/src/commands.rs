use std::sync::mpsc;
use std::time::Duration;

use serde::Serialize;

use camera_capture_core::{LogicalCamera, PhotoMetadata};

use crate::camera_state::CameraState;

const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Diagnostics returned by `get_diagnostics`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsInfo {
    pub state: String,
    pub authorization: String,
    pub current_camera: LogicalCamera,
    pub connected_camera: Option<LogicalCamera>,
    pub available_cameras: Vec<LogicalCamera>,
    pub configuration_transactions: u64,
    pub pending_captures: usize,
}

pub fn switch_camera(state: &CameraState, camera: LogicalCamera) -> Result<LogicalCamera, String> {
    state.controller.set_active_camera(camera);
    let current = state.controller.current_camera();
    if current != camera {
        return Err(format!("{} camera unavailable, staying on {}", camera, current));
    }
    Ok(current)
}

pub fn start_preview(state: &CameraState) -> Result<(), String> {
    state.controller.start_running();
    // Waits until the start has been applied.
    state.controller.connected_camera();
    if state.controller.is_running() {
        Ok(())
    } else {
        Err(format!("session not running ({:?})", state.controller.state()))
    }
}

pub fn stop_preview(state: &CameraState) {
    state.controller.stop_running();
}

pub fn take_photo(state: &CameraState) -> Result<PhotoMetadata, String> {
    let settings = state.controller.configuration().photo_settings();
    let (tx, rx) = mpsc::channel();
    state.controller.capture_photo(settings, move |result| {
        let _ = tx.send(result);
    });

    match rx.recv_timeout(CAPTURE_TIMEOUT) {
        Ok(Ok(photo)) => Ok(photo.metadata),
        Ok(Err(e)) => Err(e.to_string()),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("capture dropped, session not running".into()),
        Err(mpsc::RecvTimeoutError::Timeout) => Err("capture timed out".into()),
    }
}

pub fn get_diagnostics(state: &CameraState) -> DiagnosticsInfo {
    let controller = &state.controller;
    DiagnosticsInfo {
        state: format!("{:?}", controller.state()),
        authorization: format!("{:?}", controller.authorization()),
        current_camera: controller.current_camera(),
        connected_camera: controller.connected_camera(),
        available_cameras: controller.available_cameras(),
        configuration_transactions: controller.configuration_transaction_count(),
        pending_captures: controller.pending_capture_count(),
    }
}

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use camera_capture_core::{CameraController, CameraError, SessionObserver, SessionState};

/// App-wide state holding the camera controller and the event log.
pub struct CameraState {
    pub controller: CameraController,
    pub events: Arc<EventLog>,
}

/// SessionObserver that records events as JSON lines for the console.
#[derive(Default)]
pub struct EventLog {
    lines: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<String> {
        self.lines.lock().drain(..).collect()
    }

    fn emit<T: Serialize>(&self, event: &str, payload: T) {
        let line = serde_json::json!({ "event": event, "payload": payload }).to_string();
        self.lines.lock().push(line);
    }
}

// -- Event payloads --

#[derive(Clone, Serialize)]
struct StateChangedPayload {
    state: String,
}

#[derive(Clone, Serialize)]
struct ErrorPayload {
    message: String,
    terminal: bool,
}

impl SessionObserver for EventLog {
    fn on_state_changed(&self, state: &SessionState) {
        let name = match state {
            SessionState::Idle => "idle".to_string(),
            SessionState::Configuring => "configuring".to_string(),
            SessionState::Ready(outcome) => format!("ready({:?})", outcome).to_lowercase(),
            SessionState::Running => "running".to_string(),
            SessionState::Stopped => "stopped".to_string(),
        };
        self.emit("camera://state-changed", StateChangedPayload { state: name });
    }

    fn on_error(&self, error: &CameraError) {
        self.emit(
            "camera://error",
            ErrorPayload {
                message: error.to_string(),
                terminal: error.is_terminal(),
            },
        );
    }
}

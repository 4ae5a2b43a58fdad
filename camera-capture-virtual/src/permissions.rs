//! Scriptable camera permission.
//!
//! Mirrors the platform's permission model: a stored decision that is
//! either known up front or produced by a prompt. Prompt answers are
//! delivered on the platform delivery thread, never inside the
//! `request_access` call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::models::state::AuthorizationState;
use camera_capture_core::traits::authorization_provider::{AccessCallback, AuthorizationProvider};

use crate::delivery::DeliveryThread;

/// How the virtual user answers camera permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationMode {
    /// Access granted before the app launched.
    Authorized,
    /// Access refused before the app launched.
    Denied,
    /// Not decided yet; the prompt answers `grant` after `delay`.
    Prompt { grant: bool, delay: Duration },
    /// Not decided yet; the prompt waits for [`VirtualAuthorization::resolve`].
    Manual,
}

pub struct VirtualAuthorization {
    status: Arc<Mutex<AuthorizationState>>,
    mode: AuthorizationMode,
    waiting: Mutex<Vec<AccessCallback>>,
    prompts: AtomicUsize,
    delivery: Arc<DeliveryThread>,
}

impl VirtualAuthorization {
    pub fn new(mode: AuthorizationMode, delivery: Arc<DeliveryThread>) -> Self {
        let status = match mode {
            AuthorizationMode::Authorized => AuthorizationState::Authorized,
            AuthorizationMode::Denied => AuthorizationState::Denied,
            AuthorizationMode::Prompt { .. } | AuthorizationMode::Manual => AuthorizationState::Unknown,
        };
        Self {
            status: Arc::new(Mutex::new(status)),
            mode,
            waiting: Mutex::new(Vec::new()),
            prompts: AtomicUsize::new(0),
            delivery,
        }
    }

    pub fn mode(&self) -> AuthorizationMode {
        self.mode
    }

    /// Number of times the user was prompted.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Prompts waiting for a manual answer.
    pub fn waiting_prompts(&self) -> usize {
        self.waiting.lock().len()
    }

    /// Answer every waiting prompt. Returns how many were answered.
    pub fn resolve(&self, granted: bool) -> usize {
        record(&self.status, granted);
        let waiting: Vec<AccessCallback> = self.waiting.lock().drain(..).collect();
        let count = waiting.len();
        for callback in waiting {
            self.delivery
                .schedule(Duration::ZERO, Box::new(move || callback(granted)));
        }
        count
    }
}

impl AuthorizationProvider for VirtualAuthorization {
    fn authorization_status(&self) -> AuthorizationState {
        *self.status.lock()
    }

    fn request_access(&self, on_resolved: AccessCallback) {
        match self.authorization_status() {
            AuthorizationState::Authorized => {
                self.delivery
                    .schedule(Duration::ZERO, Box::new(move || on_resolved(true)));
                return;
            }
            AuthorizationState::Denied => {
                self.delivery
                    .schedule(Duration::ZERO, Box::new(move || on_resolved(false)));
                return;
            }
            AuthorizationState::Unknown => {}
        }

        self.prompts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            AuthorizationMode::Prompt { grant, delay } => {
                log::debug!("Virtual camera prompt answers {} after {:?}", grant, delay);
                let status = Arc::clone(&self.status);
                self.delivery.schedule(
                    delay,
                    Box::new(move || {
                        record(&status, grant);
                        on_resolved(grant);
                    }),
                );
            }
            _ => self.waiting.lock().push(on_resolved),
        }
    }
}

/// The first answer sticks.
fn record(status: &Mutex<AuthorizationState>, granted: bool) {
    let mut status = status.lock();
    if *status == AuthorizationState::Unknown {
        *status = if granted {
            AuthorizationState::Authorized
        } else {
            AuthorizationState::Denied
        };
    }
}

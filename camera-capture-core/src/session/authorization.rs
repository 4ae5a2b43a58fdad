use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::state::AuthorizationState;
use crate::traits::authorization_provider::AuthorizationProvider;
use crate::traits::callback_executor::CallbackExecutor;

/// Resolves and caches camera permission before any session work runs.
///
/// The cached value is read from the platform once at construction and
/// afterwards only changes through `request_authorization`.
pub struct AuthorizationGate {
    provider: Arc<dyn AuthorizationProvider>,
    executor: Arc<dyn CallbackExecutor>,
    state: Arc<Mutex<AuthorizationState>>,
}

impl AuthorizationGate {
    /// `executor` delivers the callback when a decision already exists.
    pub fn new(provider: Arc<dyn AuthorizationProvider>, executor: Arc<dyn CallbackExecutor>) -> Self {
        let initial = provider.authorization_status();
        log::debug!("Initial camera authorization: {:?}", initial);
        Self {
            provider,
            executor,
            state: Arc::new(Mutex::new(initial)),
        }
    }

    /// Last known decision.
    pub fn current_authorization(&self) -> AuthorizationState {
        *self.state.lock()
    }

    /// Resolve the decision, prompting only if none exists yet.
    ///
    /// `on_resolved` fires exactly once and never on the calling thread.
    pub fn request_authorization<F>(&self, on_resolved: F)
    where
        F: FnOnce(AuthorizationState) + Send + 'static,
    {
        let cached = self.current_authorization();
        if cached.is_resolved() {
            self.executor.execute(Box::new(move || on_resolved(cached)));
            return;
        }

        log::info!("Requesting camera access");
        let state = Arc::clone(&self.state);
        self.provider.request_access(Box::new(move |granted| {
            let resolved = {
                let mut current = state.lock();
                // Unknown transitions once; a late second answer keeps the first.
                if !current.is_resolved() {
                    *current = if granted {
                        AuthorizationState::Authorized
                    } else {
                        AuthorizationState::Denied
                    };
                }
                *current
            };
            log::info!("Camera access resolved: {:?}", resolved);
            on_resolved(resolved);
        }));
    }
}

pub mod authorization_provider;
pub mod callback_executor;
pub mod capture_delegate;
pub mod capture_platform;
pub mod session_observer;

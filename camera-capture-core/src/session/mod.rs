pub mod authorization;
pub mod input_switch;
pub mod preview;
pub mod registry;
pub mod state_machine;

pub mod camera;
pub mod config;
pub mod error;
pub mod orientation;
pub mod photo;
pub mod state;

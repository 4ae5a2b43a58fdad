pub mod adapter;
pub mod encoding;
pub mod tracker;

pub mod candidate;
pub mod config;
pub mod error;
pub mod frame;
pub mod identifier;
pub mod state;

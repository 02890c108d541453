//! Unit tests exercising the library through its public API.

pub mod config;
pub mod voice_state;

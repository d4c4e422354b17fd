// ABOUTME: Configuration and environment variable management for Latchkey
// ABOUTME: Centralizes variable names and the typed parsing used by every package

pub mod constants;
pub mod env;

pub use env::{ConfigError, ConfigResult};

//! Agent session running as a child process
//!
//! Spawns an agent program once per session and exchanges one JSON line per
//! turn over its stdin/stdout.

mod command;
mod config;
mod lifecycle;
mod transport;

pub use config::{
    DANGEROUS_ENV_VARS, DEFAULT_CLOSE_TIMEOUT, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_RESPONSE_TIMEOUT,
    SubprocessConfig,
};
pub use transport::SubprocessAgent;

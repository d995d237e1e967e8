//! Type definitions for the chatbot session core
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`)
//! - [`options`] - Gate and lifecycle configuration
//! - [`status`] - Handle state and service status snapshots
//! - [`turn`] - Turn request/response payloads

pub mod identifiers;
pub mod options;
pub mod status;
pub mod turn;

pub use identifiers::SessionId;
pub use options::{SessionOptions, SessionOptionsBuilder};
pub use status::{InitState, SessionStatus};
pub use turn::{TurnOutcome, TurnRequest, TurnResponse};

//! # Chatbot Session
//!
//! Turn serialization and session lifecycle for chat assistant backends that
//! keep one long-lived connection to an external agent runtime.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chatbot_session::{SessionManager, SessionOptions, TurnRequest};
//! use chatbot_session::transport::{SubprocessAgent, SubprocessConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = || SubprocessAgent::new(SubprocessConfig::new("my-agent"));
//! let manager = SessionManager::new(factory, SessionOptions::from_env()?)?;
//!
//! let turn = manager
//!     .send_turn(TurnRequest::new("Which plans do you offer?", None))
//!     .await?;
//! log::info!("Assistant: {}", turn.response);
//!
//! // Send the updated history back with the next message.
//! let next = TurnRequest::new("And the cheapest one?", Some(turn.updated_history));
//! manager.send_turn(next).await?;
//!
//! manager.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Pieces
//!
//! ### 1. [`SessionGate`]
//!
//! At most one turn runs at a time, and consecutive turns start at least
//! [`SessionOptions::min_interval`] apart. Waiters are served in arrival
//! order and suspend on the runtime rather than polling.
//!
//! ### 2. [`SessionLifecycle`]
//!
//! Owns the single current agent session. The session is created lazily,
//! connected under [`SessionOptions::init_timeout`], and torn down after any
//! failed turn so the next turn reconnects from scratch.
//!
//! ### 3. [`SessionManager`]
//!
//! Composes the two. Reset, new-session and shutdown also take the gate so
//! they never close a session a running turn is using.
//!
//! ### 4. Agent transports
//!
//! The lifecycle only sees the [`AgentSession`] trait. Two implementations
//! ship with the crate: [`transport::SubprocessAgent`] (JSON lines over a
//! child process's stdio) and, with the `http` feature,
//! `transport::HttpAgent`.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with [`ChatError`]. Each error
//! carries a machine-readable [`ChatError::reason`]; [`TurnOutcome`] renders
//! a result as the JSON body expected by the chat frontend.

pub mod conversation;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod manager;
pub mod transport;
pub mod types;

pub use error::{ChatError, Result};
pub use gate::{GatePermit, SessionGate};
pub use lifecycle::{ReadySession, SessionHandle, SessionLifecycle};
pub use manager::SessionManager;
pub use transport::{AgentOutput, AgentSession, SessionFactory};
pub use types::{
    InitState, SessionId, SessionOptions, SessionStatus, TurnOutcome, TurnRequest, TurnResponse,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install `env_logger` with an `info` default filter
///
/// `RUST_LOG` overrides the default. Calling this more than once is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

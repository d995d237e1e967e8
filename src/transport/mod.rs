//! Agent session capability and its implementations
//!
//! The lifecycle treats an agent session as opaque: it can be connected,
//! asked to answer a conversation, and closed. Tool invocation, prompts and
//! model choice all live behind this trait.

#[cfg(feature = "http")]
pub mod http;
pub mod subprocess;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Output of one agent run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Final text produced by the agent
    pub final_output: String,
}

impl AgentOutput {
    /// Wrap a final output string
    pub fn new(final_output: impl Into<String>) -> Self {
        Self {
            final_output: final_output.into(),
        }
    }
}

/// Connection to an external agent runtime
///
/// Methods take `&self` so a ready session can be shared with the detached
/// initialization task; implementations keep their connection state behind
/// interior mutability.
pub trait AgentSession: Send + Sync + 'static {
    /// Establish the connection to the agent runtime and its tool server
    ///
    /// # Errors
    /// Returns error if the connection cannot be established
    fn connect(&self) -> impl Future<Output = Result<()>> + Send;

    /// Run the agent over the full conversation text
    ///
    /// # Errors
    /// Returns error if the agent run fails or the connection is broken
    fn send(&self, conversation: &str) -> impl Future<Output = Result<AgentOutput>> + Send;

    /// Close the connection and release resources
    ///
    /// # Errors
    /// Returns error if cleanup fails; callers treat this as best-effort
    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Produces fresh, unconnected agent sessions
pub trait SessionFactory: Send + Sync + 'static {
    /// Session type produced by this factory
    type Session: AgentSession;

    /// Construct a new session; must not perform the connect itself
    ///
    /// # Errors
    /// Returns error if the session cannot be constructed (e.g. missing credentials)
    fn create(&self) -> Result<Self::Session>;
}

impl<F, S> SessionFactory for F
where
    F: Fn() -> Result<S> + Send + Sync + 'static,
    S: AgentSession,
{
    type Session = S;

    fn create(&self) -> Result<S> {
        self()
    }
}

#[cfg(feature = "http")]
pub use http::{HttpAgent, HttpAgentConfig};
pub use subprocess::{SubprocessAgent, SubprocessConfig};

//! Error types for the chatbot session core

use thiserror::Error;

/// Main error type for session gating and lifecycle operations
#[derive(Error, Debug)]
pub enum ChatError {
    /// Session initialization did not finish within the configured bound
    #[error("Session initialization timed out after {timeout_ms} ms")]
    SessionInitTimeout {
        /// Configured initialization timeout in milliseconds
        timeout_ms: u64,
    },

    /// Session could not be created or connected
    #[error("Session initialization failed: {0}")]
    SessionInit(String),

    /// A turn failed after the session was ready
    #[error("Failed to send message: {0}")]
    SessionSend(String),

    /// The session manager was shut down and accepts no more work
    #[error("Session manager has been shut down")]
    ShutDown,

    /// Inbound turn request was rejected before reaching the gate
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Agent program not found on this machine
    #[error("Agent program not found: {0}")]
    ProgramNotFound(String),

    /// Connection error when talking to the agent runtime
    #[error("Connection error: {0}")]
    Connection(String),

    /// Process execution error with exit code
    #[error("Process error (exit code {exit_code}): {message}")]
    Process {
        /// Error message
        message: String,
        /// Process exit code
        exit_code: i32,
    },

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON decode error on the agent wire
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout error outside of session initialization
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for chatbot session operations
pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Create an initialization timeout error
    #[must_use]
    pub fn session_init_timeout(timeout: std::time::Duration) -> Self {
        Self::SessionInitTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create an initialization error
    pub fn session_init(msg: impl Into<String>) -> Self {
        Self::SessionInit(msg.into())
    }

    /// Create a send error
    pub fn session_send(msg: impl Into<String>) -> Self {
        Self::SessionSend(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a program-not-found error
    pub fn program_not_found(program: impl Into<String>) -> Self {
        Self::ProgramNotFound(program.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a process error
    pub fn process(msg: impl Into<String>, exit_code: i32) -> Self {
        Self::Process {
            message: msg.into(),
            exit_code,
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Machine-readable failure reason for the HTTP collaborator
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SessionInitTimeout { .. } => "session_init_timeout",
            Self::SessionInit(_) => "session_init_error",
            Self::SessionSend(_) => "session_send_error",
            Self::ShutDown => "shut_down",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ProgramNotFound(_) => "program_not_found",
            Self::Connection(_) => "connection_error",
            Self::Process { .. } => "process_error",
            Self::Transport(_) => "transport_error",
            Self::JsonDecode(_) => "json_decode_error",
            Self::Io(_) => "io_error",
            Self::Timeout(_) => "timeout",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Whether the caller may simply retry the same turn
    ///
    /// Session failures are retryable because the next turn reinitializes
    /// from scratch.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SessionInitTimeout { .. } | Self::SessionInit(_) | Self::SessionSend(_)
        )
    }
}

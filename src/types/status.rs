//! Session state and status snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::SessionId;

/// Initialization state of a session handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitState {
    /// Constructed, `connect()` not yet called
    Uninitialized,
    /// `connect()` in flight
    Initializing,
    /// Connected and usable for turns
    Ready,
    /// Closed; never reused
    Closed,
}

impl InitState {
    /// Whether a handle in this state can serve a turn
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Point-in-time view of the chat service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Current session, if one is installed
    pub session_id: Option<SessionId>,
    /// State of the current session
    pub state: Option<InitState>,
    /// When the current session was created
    pub created_at: Option<DateTime<Utc>>,
    /// Whether a turn currently holds the gate
    pub gate_active: bool,
    /// Number of session initializations attempted so far
    pub initializations: u64,
    /// Turns that returned a response
    pub turns_completed: u64,
    /// Turns that returned an error
    pub turns_failed: u64,
}

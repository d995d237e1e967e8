//! Session handle
//!
//! Wraps one agent session together with its initialization state. Closing
//! consumes the handle, so a closed session can never be handed out again.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::transport::AgentSession;
use crate::types::{InitState, SessionId};

/// One logical conversation session with the external agent
pub struct SessionHandle<S> {
    id: SessionId,
    session: Arc<S>,
    state: InitState,
    created_at: DateTime<Utc>,
}

/// Cheap clone of a ready session, usable without holding the lifecycle slot
pub struct ReadySession<S> {
    /// Id of the handle this session belongs to
    pub id: SessionId,
    /// The connected agent session
    pub session: Arc<S>,
}

impl<S> std::fmt::Debug for ReadySession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadySession").field("id", &self.id).finish()
    }
}

impl<S> Clone for ReadySession<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: AgentSession> SessionHandle<S> {
    /// Wrap a freshly constructed, unconnected session
    pub(crate) fn new(session: S) -> Self {
        Self {
            id: SessionId::new(),
            session: Arc::new(session),
            state: InitState::Uninitialized,
            created_at: Utc::now(),
        }
    }

    /// Handle identifier
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current initialization state
    #[must_use]
    pub const fn state(&self) -> InitState {
        self.state
    }

    /// Creation time
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn session(&self) -> &Arc<S> {
        &self.session
    }

    pub(crate) fn set_state(&mut self, state: InitState) {
        log::trace!("[{}] {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
    }

    pub(crate) fn ready(&self) -> ReadySession<S> {
        ReadySession {
            id: self.id,
            session: Arc::clone(&self.session),
        }
    }

    /// Best-effort close: failures are logged, never returned
    pub(crate) async fn close(mut self) {
        let previous = self.state;
        self.set_state(InitState::Closed);

        match self.session.close().await {
            Ok(()) => log::info!("[{}] Session closed (was {:?})", self.id, previous),
            Err(e) => log::warn!("[{}] Error closing session: {}", self.id, e),
        }
    }
}

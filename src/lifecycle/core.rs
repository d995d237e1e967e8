//! Core lifecycle structure: the current-session slot, lookup and reset

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::transport::SessionFactory;
use crate::types::{InitState, SessionId, SessionOptions};

use super::handle::{ReadySession, SessionHandle};

/// Owner of the single current agent session
///
/// At most one [`SessionHandle`] is installed at a time, and only in the
/// `Ready` state. Failed or timed-out initializations are never installed.
pub struct SessionLifecycle<F: SessionFactory> {
    pub(super) factory: F,
    pub(super) options: SessionOptions,
    pub(super) current: Mutex<Option<SessionHandle<F::Session>>>,
    pub(super) initializations: AtomicU64,
}

impl<F: SessionFactory> SessionLifecycle<F> {
    /// Create a lifecycle manager with no session yet
    #[must_use]
    pub fn new(factory: F, options: SessionOptions) -> Self {
        Self {
            factory,
            options,
            current: Mutex::new(None),
            initializations: AtomicU64::new(0),
        }
    }

    /// Return the ready session, initializing a fresh one if needed
    ///
    /// # Errors
    /// Returns `SessionInitTimeout` if initialization exceeds the configured
    /// bound, or `SessionInit` if the session cannot be created or connected
    pub async fn get_or_create_session(&self) -> Result<ReadySession<F::Session>> {
        let mut current = self.current.lock().await;

        if let Some(handle) = current.as_ref()
            && handle.state().is_ready()
        {
            return Ok(handle.ready());
        }

        if let Some(stale) = current.take() {
            log::warn!(
                "[{}] Discarding session in state {:?}",
                stale.id(),
                stale.state()
            );
            stale.close().await;
        }

        let handle = self.initialize().await?;
        let ready = handle.ready();
        *current = Some(handle);
        Ok(ready)
    }

    /// Close and discard the current session, if any
    ///
    /// Succeeds when there is nothing to reset.
    ///
    /// # Errors
    /// Never fails today; the `Result` leaves room for collaborators that do
    pub async fn force_reset(&self) -> Result<()> {
        let Some(handle) = self.current.lock().await.take() else {
            log::debug!("No session to reset");
            return Ok(());
        };

        log::info!("[{}] Resetting session", handle.id());
        handle.close().await;
        Ok(())
    }

    /// Close and discard the current session only if it is still `id`
    pub(crate) async fn teardown(&self, id: SessionId) {
        let mut current = self.current.lock().await;
        match current.as_ref() {
            Some(handle) if handle.id() == id => {
                if let Some(handle) = current.take() {
                    log::warn!("[{id}] Tearing down session after failed turn");
                    handle.close().await;
                }
            }
            _ => log::debug!("[{id}] Session already replaced, nothing to tear down"),
        }
    }

    /// Id, state and creation time of the current session
    pub async fn current(&self) -> Option<(SessionId, InitState, DateTime<Utc>)> {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|h| (h.id(), h.state(), h.created_at()))
    }

    /// Number of initializations started since construction
    #[must_use]
    pub fn initialization_count(&self) -> u64 {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Options this lifecycle was built with
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

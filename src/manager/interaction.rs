//! Turn, reset and new-session entry points

use std::sync::atomic::Ordering;

use crate::error::Result;
use crate::transport::SessionFactory;
use crate::types::{SessionId, TurnRequest, TurnResponse};

use super::core::SessionManager;

impl<F: SessionFactory> SessionManager<F> {
    /// Run one conversation turn
    ///
    /// Waits for the gate, runs the turn on the (possibly freshly
    /// initialized) session and releases the gate whatever the outcome.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for an empty message, `ShutDown` after
    /// [`shutdown`](Self::shutdown), otherwise the session error that ended
    /// the turn
    pub async fn send_turn(&self, request: TurnRequest) -> Result<TurnResponse> {
        request.validate()?;
        self.ensure_running()?;

        let permit = self.gate.acquire().await;
        // Shutdown may have completed while this turn was queued.
        self.ensure_running()?;
        let result = self.lifecycle.send_turn(&request).await;
        permit.release();

        match &result {
            Ok(_) => {
                self.turns_completed.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                self.turns_failed.fetch_add(1, Ordering::SeqCst);
                log::warn!("Turn failed ({}): {}", e.reason(), e);
            }
        }
        result
    }

    /// Close and drop the current session
    ///
    /// Succeeds when no session exists. Waits for a running turn first.
    ///
    /// # Errors
    /// Propagates lifecycle errors
    pub async fn reset_session(&self) -> Result<()> {
        let _permit = self.gate.acquire_exclusive().await;
        self.lifecycle.force_reset().await
    }

    /// Replace the current session with a freshly initialized one
    ///
    /// # Errors
    /// Returns `ShutDown` after [`shutdown`](Self::shutdown), or the
    /// initialization error if the new session cannot be made ready
    pub async fn new_session(&self) -> Result<SessionId> {
        let _permit = self.gate.acquire_exclusive().await;
        self.ensure_running()?;
        self.lifecycle.force_reset().await?;
        let ready = self.lifecycle.get_or_create_session().await?;
        log::info!("[{}] Chat session initialized successfully", ready.id);
        Ok(ready.id)
    }
}

//! Core session manager structure, status and shutdown

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{ChatError, Result};
use crate::gate::SessionGate;
use crate::lifecycle::SessionLifecycle;
use crate::transport::SessionFactory;
use crate::types::{SessionOptions, SessionStatus};

/// Explicitly owned replacement for the process-wide session globals
///
/// The `SessionManager` composes the turn gate with the session lifecycle:
/// - Turns are serialized and spaced by the gate
/// - The session is created lazily and recreated after failures
/// - Reset, new-session and shutdown take the gate exclusively so they never
///   pull a session out from under a running turn
///
/// Share it with request handlers through an `Arc`.
pub struct SessionManager<F: SessionFactory> {
    pub(super) gate: SessionGate,
    pub(super) lifecycle: SessionLifecycle<F>,
    pub(super) turns_completed: AtomicU64,
    pub(super) turns_failed: AtomicU64,
    pub(super) shut_down: AtomicBool,
}

impl<F: SessionFactory> SessionManager<F> {
    /// Create a manager; no session is created until the first turn
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the options are unusable
    pub fn new(factory: F, options: SessionOptions) -> Result<Self> {
        options.validate()?;
        log::debug!("Creating SessionManager with {options:?}");

        Ok(Self {
            gate: SessionGate::new(options.min_interval),
            lifecycle: SessionLifecycle::new(factory, options),
            turns_completed: AtomicU64::new(0),
            turns_failed: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Snapshot of the current session and counters
    pub async fn status(&self) -> SessionStatus {
        let current = self.lifecycle.current().await;

        SessionStatus {
            session_id: current.map(|(id, _, _)| id),
            state: current.map(|(_, state, _)| state),
            created_at: current.map(|(_, _, created_at)| created_at),
            gate_active: self.gate.is_active(),
            initializations: self.lifecycle.initialization_count(),
            turns_completed: self.turns_completed.load(Ordering::SeqCst),
            turns_failed: self.turns_failed.load(Ordering::SeqCst),
        }
    }

    /// The turn gate
    #[must_use]
    pub const fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// The session lifecycle
    #[must_use]
    pub const fn lifecycle(&self) -> &SessionLifecycle<F> {
        &self.lifecycle
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Fail with `ShutDown` once the manager has been shut down
    pub(super) fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(ChatError::ShutDown);
        }
        Ok(())
    }

    /// Gracefully shut the manager down
    ///
    /// Waits for any running turn, then closes the current session. Later
    /// turns and new-session requests fail with `ShutDown`. Should be called
    /// before process exit.
    ///
    /// # Errors
    /// Propagates lifecycle errors; closing itself is best-effort
    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down SessionManager...");
        let _permit = self.gate.acquire_exclusive().await;
        self.shut_down.store(true, Ordering::SeqCst);
        self.lifecycle.force_reset().await?;
        log::info!("SessionManager shutdown complete");
        Ok(())
    }
}

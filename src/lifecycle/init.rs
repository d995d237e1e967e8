//! Session initialization under a bounded timeout
//!
//! `connect()` runs as a detached task raced against a timer. On timeout the
//! task is not cancelled; its result is ignored and, once it finishes, the
//! abandoned session is closed in the background so a late connection does
//! not linger.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::task::JoinHandle;

use crate::error::{ChatError, Result};
use crate::transport::{AgentSession, SessionFactory};
use crate::types::InitState;

use super::core::SessionLifecycle;
use super::handle::SessionHandle;

impl<F: SessionFactory> SessionLifecycle<F> {
    /// Construct and connect a new handle
    pub(super) async fn initialize(&self) -> Result<SessionHandle<F::Session>> {
        self.initializations.fetch_add(1, Ordering::SeqCst);

        let session = self
            .factory
            .create()
            .map_err(|e| ChatError::session_init(e.to_string()))?;
        let mut handle = SessionHandle::new(session);
        log::info!("[{}] Initializing new chatbot session...", handle.id());
        handle.set_state(InitState::Initializing);

        let session = Arc::clone(handle.session());
        let mut connect = tokio::spawn(async move { session.connect().await });

        match tokio::time::timeout(self.options.init_timeout, &mut connect).await {
            Ok(Ok(Ok(()))) => {
                handle.set_state(InitState::Ready);
                log::info!("[{}] Chatbot session initialized successfully", handle.id());
                Ok(handle)
            }
            Ok(Ok(Err(e))) => {
                log::error!("[{}] Failed to connect session: {}", handle.id(), e);
                handle.close().await;
                Err(ChatError::session_init(e.to_string()))
            }
            Ok(Err(join_err)) => {
                log::error!("[{}] Connect task failed: {}", handle.id(), join_err);
                handle.close().await;
                Err(ChatError::session_init(format!(
                    "connect task failed: {join_err}"
                )))
            }
            Err(_) => {
                log::error!(
                    "[{}] Session initialization timed out after {} ms",
                    handle.id(),
                    self.options.init_timeout.as_millis()
                );
                reap_abandoned(handle, connect);
                Err(ChatError::session_init_timeout(self.options.init_timeout))
            }
        }
    }
}

/// Wait out an abandoned connect in the background, then close its session
fn reap_abandoned<S: AgentSession>(handle: SessionHandle<S>, connect: JoinHandle<Result<()>>) {
    tokio::spawn(async move {
        if let Ok(Ok(())) = connect.await {
            log::warn!(
                "[{}] Abandoned session connected after timeout, closing it",
                handle.id()
            );
        }
        handle.close().await;
    });
}

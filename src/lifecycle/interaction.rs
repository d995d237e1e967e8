//! Turn execution against the current session

use crate::conversation;
use crate::error::{ChatError, Result};
use crate::transport::{AgentSession, SessionFactory};
use crate::types::{TurnRequest, TurnResponse};

use super::core::SessionLifecycle;

impl<F: SessionFactory> SessionLifecycle<F> {
    /// Run one turn on the ready session
    ///
    /// Any failure from the agent tears the current session down so the next
    /// turn starts from a fresh connection. Callers are expected to hold the
    /// gate.
    ///
    /// # Errors
    /// Returns the initialization error if no session could be made ready,
    /// or `SessionSend` if the agent run fails
    pub async fn send_turn(&self, request: &TurnRequest) -> Result<TurnResponse> {
        let ready = self.get_or_create_session().await?;

        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let conversation = conversation::compose(
            request.history(),
            &request.message,
            self.options.token_limit,
        );
        log::debug!(
            "[{}] Sending turn (~{} tokens)",
            ready.id,
            conversation::estimate_tokens(&conversation)
        );

        match ready.session.send(&conversation).await {
            Ok(output) => {
                let updated_history =
                    conversation::updated_history(&conversation, &output.final_output);
                Ok(TurnResponse {
                    response: output.final_output,
                    updated_history,
                })
            }
            Err(e) => {
                log::error!("[{}] Error sending message: {}", ready.id, e);
                self.teardown(ready.id).await;
                Err(ChatError::session_send(e.to_string()))
            }
        }
    }
}

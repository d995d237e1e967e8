//! Conversation turn payloads
//!
//! Field names follow the JSON used by the chat frontend
//! (`message`, `conversationHistory`, `updatedHistory`).

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// One inbound user turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// The user's message
    #[serde(default)]
    pub message: String,
    /// Serialized prior conversation, absent on the first turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<String>,
}

impl TurnRequest {
    /// Create a turn request
    pub fn new(message: impl Into<String>, conversation_history: Option<String>) -> Self {
        Self {
            message: message.into(),
            conversation_history,
        }
    }

    /// Reject requests that should never reach the gate
    ///
    /// Only a missing or empty message is rejected; whitespace is passed
    /// through to the agent as-is.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the message is empty
    pub fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(ChatError::invalid_request("message is required"));
        }
        Ok(())
    }

    /// Prior history, treating an empty string like no history
    #[must_use]
    pub fn history(&self) -> Option<&str> {
        self.conversation_history
            .as_deref()
            .filter(|h| !h.is_empty())
    }
}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    /// The agent's final output for this turn
    pub response: String,
    /// Conversation including this turn, to be sent back with the next one
    pub updated_history: String,
}

/// Response body handed back to the HTTP collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    /// Whether the turn succeeded
    pub success: bool,
    /// Agent output on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Updated conversation on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_history: Option<String>,
    /// Generic failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Underlying error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Whether retrying the same turn is expected to help
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl TurnOutcome {
    /// Successful outcome
    #[must_use]
    pub fn success(turn: TurnResponse) -> Self {
        Self {
            success: true,
            response: Some(turn.response),
            updated_history: Some(turn.updated_history),
            error: None,
            details: None,
            reason: None,
            retryable: None,
        }
    }

    /// Failed outcome
    #[must_use]
    pub fn failure(err: &ChatError) -> Self {
        let error = match err {
            ChatError::InvalidRequest(msg) => msg.clone(),
            _ => "Failed to send message".to_string(),
        };
        Self {
            success: false,
            response: None,
            updated_history: None,
            error: Some(error),
            details: Some(err.to_string()),
            reason: Some(err.reason()),
            retryable: Some(err.is_retryable()),
        }
    }
}

impl From<Result<TurnResponse>> for TurnOutcome {
    fn from(result: Result<TurnResponse>) -> Self {
        match result {
            Ok(turn) => Self::success(turn),
            Err(e) => Self::failure(&e),
        }
    }
}

//! Conversation text composition
//!
//! History travels as one flat transcript of `User:` / `Assistant:` blocks.
//! Token counts are estimated with the `bytes / 4` heuristic; the budget is
//! approximate by nature.

/// Separator between transcript blocks
const BLOCK_SEPARATOR: &str = "\n\n";

/// Estimate the number of tokens in a text string
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Build the conversation text sent to the agent for one turn
///
/// When `token_limit` is set and the transcript exceeds it, only the most
/// recent tail that fits is kept.
#[must_use]
pub fn compose(history: Option<&str>, message: &str, token_limit: Option<usize>) -> String {
    let conversation = match history {
        Some(history) if !history.is_empty() => {
            format!("{history}{BLOCK_SEPARATOR}User: {message}")
        }
        _ => format!("User: {message}"),
    };

    match token_limit {
        Some(limit) => truncate_to_budget(conversation, limit),
        None => conversation,
    }
}

/// Append the agent's answer to the conversation it was given
#[must_use]
pub fn updated_history(conversation: &str, final_output: &str) -> String {
    format!("{conversation}{BLOCK_SEPARATOR}Assistant: {final_output}")
}

/// Keep the tail of `text` that fits in `limit` estimated tokens
#[must_use]
pub fn truncate_to_budget(text: String, limit: usize) -> String {
    if estimate_tokens(&text) <= limit {
        return text;
    }

    let max_bytes = limit.saturating_mul(4);
    let mut start = text.len().saturating_sub(max_bytes);
    while !text.is_char_boundary(start) {
        start += 1;
    }

    log::debug!(
        "Conversation over budget ({} > {limit} tokens), dropping {start} leading bytes",
        estimate_tokens(&text)
    );
    text[start..].to_string()
}

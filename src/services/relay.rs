// src/services/relay.rs
use crate::message::{ChatRequest, ChatResponse};

use super::completion::{CompletionClient, UpstreamError};

pub const SYSTEM_PROMPT: &str =
    "You are King Orian, a mythic advisor. Speak with depth, clarity, and power.";
pub const FALLBACK_MESSAGE: &str = "Hello, who are you?";
pub const PROBE_MESSAGE: &str = "connection_test";

/// Forward one message to the completion API. No retry, no caching.
///
/// `probe` comes from the transport-level probe header, never from the
/// message text, so a user typing [`PROBE_MESSAGE`] still reaches upstream.
pub async fn relay_message(
    client: &dyn CompletionClient,
    request: &ChatRequest,
    probe: bool,
) -> Result<ChatResponse, UpstreamError> {
    if probe {
        return Ok(ChatResponse {
            content: "connected".to_string(),
            follow_up_questions: None,
            status: Some("connected".to_string()),
        });
    }

    let user_message = match request.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => FALLBACK_MESSAGE,
    };

    let content = client.complete(SYSTEM_PROMPT, user_message).await?;
    Ok(ChatResponse::text(content))
}

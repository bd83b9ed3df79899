use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, PROBE_HEADER},
    services::relay::relay_message,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Rejected {
        status: e.status(),
        message: e.body_text(),
    })?;
    let probe = headers.contains_key(PROBE_HEADER);

    tracing::info!(
        client_id = request.client_id.as_deref().unwrap_or("-"),
        conversation_id = request.conversation_id.as_deref().unwrap_or("-"),
        message_len = request.message.as_deref().map_or(0, str::len),
        probe,
        "relaying chat message"
    );

    let reply = relay_message(state.completion.as_ref(), &request, probe).await?;
    Ok(Json(reply))
}

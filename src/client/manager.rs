// src/client/manager.rs
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::message::{ChatRequest, ChatResponse, Preferences, default_preferences};
use crate::services::relay::PROBE_MESSAGE;

use super::{
    error::ClientError,
    retry::RetryPolicy,
    sanitize::{sanitize_input, validate_input},
    session::{ClientSession, ConnectionStatus},
    transport::{RequestKind, Transport},
};

pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(30);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds requests for the session, sends them with timeout and backoff, and
/// checks what comes back.
pub struct RequestManager<T> {
    transport: T,
    session: ClientSession,
    policy: RetryPolicy,
    preferences: Preferences,
    message_timeout: Duration,
    probe_timeout: Duration,
}

impl<T: Transport> RequestManager<T> {
    pub fn new(transport: T, session: ClientSession) -> Self {
        Self {
            transport,
            session,
            policy: RetryPolicy::default(),
            preferences: default_preferences(),
            message_timeout: MESSAGE_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeouts(mut self, message: Duration, probe: Duration) -> Self {
        self.message_timeout = message;
        self.probe_timeout = probe;
        self
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Replace the session, as a page reload would.
    pub fn reset_session(&mut self) {
        self.session = ClientSession::new();
    }

    /// Validate, send and check one user message.
    ///
    /// The session retry counter is bumped on failure and cleared on success;
    /// invalid input fails before it is touched. A blank reply counts as a
    /// format failure.
    pub async fn send_message(&mut self, raw_text: &str) -> Result<ChatResponse, ClientError> {
        validate_input(raw_text).map_err(ClientError::Validation)?;

        let result = self.request(raw_text, RequestKind::Message, self.message_timeout).await.and_then(|reply| {
            if reply.content.trim().is_empty() {
                Err(ClientError::Format("Empty response from King Orian".to_string()))
            } else {
                Ok(reply)
            }
        });

        match result {
            Ok(reply) => {
                self.session.retry_count = 0;
                Ok(reply)
            }
            Err(e) => {
                self.session.retry_count += 1;
                Err(e)
            }
        }
    }

    /// Ask the relay whether it is reachable and update the advisory status.
    pub async fn probe_connection(&mut self) -> ConnectionStatus {
        self.session.status = ConnectionStatus::Connecting;

        let status = match self.request(PROBE_MESSAGE, RequestKind::Probe, self.probe_timeout).await {
            Ok(reply) if reply.status.as_deref() == Some("connected") => {
                self.session.retry_count = 0;
                ConnectionStatus::Connected
            }
            Ok(_) => {
                tracing::warn!("connection probe got an unexpected reply");
                ConnectionStatus::Disconnected
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection probe failed");
                ConnectionStatus::Disconnected
            }
        };

        self.session.status = status;
        status
    }

    /// Browser-style online/offline transition.
    pub fn set_online(&mut self, online: bool) -> ConnectionStatus {
        self.session.is_online = online;
        self.session.status = if online {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        self.session.status
    }

    pub fn mark_disconnected(&mut self) {
        self.session.status = ConnectionStatus::Disconnected;
    }

    fn build_request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            message: Some(sanitize_input(message)),
            client_id: Some(self.session.client_id().to_string()),
            conversation_id: Some(self.session.conversation_id().to_string()),
            preferences: self.preferences.clone(),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    async fn request(
        &self,
        message: &str,
        kind: RequestKind,
        timeout: Duration,
    ) -> Result<ChatResponse, ClientError> {
        if !self.session.is_online {
            return Err(ClientError::Network("No internet connection".to_string()));
        }

        let request = self.build_request(message);
        let attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(timeout, self.transport.send(&request, kind)).await {
                Ok(result) => result.and_then(parse_response),
                Err(_) => Err(ClientError::Timeout(timeout)),
            };

            let error = match outcome {
                Ok(reply) => return Ok(reply),
                Err(e) => e,
            };

            if attempt + 1 >= attempts || !error.is_retryable() {
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "retrying request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// A success body must be an object with a string `content`.
pub fn parse_response(body: Value) -> Result<ChatResponse, ClientError> {
    let Value::Object(mut map) = body else {
        return Err(ClientError::Format("response is not a JSON object".to_string()));
    };

    let content = match map.remove("content") {
        Some(Value::String(s)) => s,
        _ => return Err(ClientError::Format("`content` is missing or not a string".to_string())),
    };

    let follow_up_questions = match map.remove("followUpQuestions") {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    };

    let status = match map.remove("status") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    Ok(ChatResponse { content, follow_up_questions, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_content_and_follow_ups() {
        let reply = parse_response(json!({
            "content": "Steel yourself.",
            "followUpQuestions": ["Why?", 3, "How?"]
        }))
        .unwrap();
        assert_eq!(reply.content, "Steel yourself.");
        assert_eq!(reply.follow_up_questions, Some(vec!["Why?".to_string(), "How?".to_string()]));
    }

    #[test]
    fn rejects_missing_or_non_string_content() {
        assert!(matches!(parse_response(json!({"reply": "hi"})), Err(ClientError::Format(_))));
        assert!(matches!(parse_response(json!({"content": 5})), Err(ClientError::Format(_))));
        assert!(matches!(parse_response(json!("content")), Err(ClientError::Format(_))));
    }
}

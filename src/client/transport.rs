use async_trait::async_trait;
use serde_json::Value;

use crate::message::{ChatRequest, ErrorBody, PROBE_HEADER};

use super::error::ClientError;

/// Whether a send carries user text or is a connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Message,
    Probe,
}

/// One POST to the relay. Returns the decoded success body untouched;
/// shape validation is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ChatRequest, kind: RequestKind) -> Result<Value, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest, kind: RequestKind) -> Result<Value, ClientError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("X-Requested-With", "XMLHttpRequest");
        if kind == RequestKind::Probe {
            builder = builder.header(PROBE_HEADER, "1");
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
            return Err(ClientError::Server { status: status.as_u16(), message });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                ClientError::Format(e.to_string())
            } else {
                ClientError::Network(e.to_string())
            }
        })
    }
}

// src/client/session.rs
use std::fmt;

use chrono::Utc;
use uuid::Uuid;

/// Advisory connectivity shown to the user. Never gates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// State scoped to one loaded widget. Identifiers never change for its lifetime.
#[derive(Debug, Clone)]
pub struct ClientSession {
    client_id: String,
    conversation_id: String,
    pub retry_count: u32,
    pub is_online: bool,
    pub status: ConnectionStatus,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            client_id: generate_client_id(),
            conversation_id: generate_conversation_id(),
            retry_count: 0,
            is_online: true,
            status: ConnectionStatus::Connecting,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn now_millis() -> u128 {
    Utc::now().timestamp_millis().max(0) as u128
}

/// `client_<base36 ms>_<32 hex>`
pub fn generate_client_id() -> String {
    format!("client_{}_{}", to_base36(now_millis()), Uuid::new_v4().simple())
}

/// `conv_<ms>_<9 base36>`
pub fn generate_conversation_id() -> String {
    let random = to_base36(Uuid::new_v4().as_u128());
    let suffix: String = random.chars().rev().take(9).collect();
    format!("conv_{}_{}", now_millis(), suffix)
}

// src/message.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Set only on connectivity checks; the relay answers those itself.
pub const PROBE_HEADER: &str = "x-orian-probe";

/// Body the widget posts to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Fixed key/value map sent with every request.
pub type Preferences = BTreeMap<String, String>;

pub fn default_preferences() -> Preferences {
    [
        ("responseStyle", "strategic"),
        ("responseLength", "detailed"),
        ("followUpQuestions", "always"),
        ("autoSave", "enabled"),
        ("exportFormat", "txt"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_questions: Option<Vec<String>>,
    /// Only set on replies to the connectivity probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            follow_up_questions: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

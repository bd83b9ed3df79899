// src/client/transcript.rs
use chrono::{DateTime, Local};

pub const BOT_SPEAKER: &str = "King Orian";
pub const USER_SPEAKER: &str = "You";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Bot,
}

/// What the renderer and the exporter see: message, sender, timestamp.
#[derive(Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub speaker: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let speaker = match role {
            MessageRole::User => USER_SPEAKER,
            MessageRole::Bot => BOT_SPEAKER,
        };
        Self {
            role,
            speaker: speaker.to_string(),
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    /// `HH:MM`, as shown next to each bubble.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Rendered conversation for the current session. Kept in memory only.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the new length.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_transcript_flow() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.push(Message::new(MessageRole::User, "hello")), 1);
        assert_eq!(transcript.push(Message::new(MessageRole::Bot, "Greetings.")), 2);
        assert_eq!(transcript.messages()[1].speaker, BOT_SPEAKER);
        assert_eq!(transcript.messages()[0].time_label().len(), 5);
        transcript.clear();
        assert_eq!(transcript.len(), 0);
    }
}

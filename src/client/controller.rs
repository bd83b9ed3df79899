// src/client/controller.rs
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::message::ChatResponse;

use super::{
    error::ClientError,
    export::{ExportError, export_transcript},
    manager::RequestManager,
    sanitize::validate_input,
    session::{ClientSession, ConnectionStatus},
    transcript::{Message, MessageRole, Transcript},
    transport::Transport,
};

const ERROR_PREFIX: &str = "The realm experiences turbulence. ";
pub const INVALID_INPUT_TEXT: &str = "Please enter a valid message.";

/// What the front end draws. Implementations own their own interior state.
pub trait Renderer: Send + Sync {
    fn message(&self, message: &Message);
    fn follow_ups(&self, questions: &[String]);
    fn typing(&self, visible: bool);
    fn error(&self, notice: &ErrorNotice);
    fn clear_error(&self);
    fn status(&self, status: ConnectionStatus, text: &str);
}

/// A user-facing error, optionally carrying the text to resend on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub text: String,
    pub retry_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Empty input, or another submission was in flight.
    Ignored,
    Rejected,
    Answered(ChatResponse),
    Failed(ErrorNotice),
}

/// Clears the in-flight flag and hides the typing indicator on every exit,
/// including when the submit future is dropped mid-request.
struct ProcessingGuard<'a, R: Renderer> {
    flag: &'a AtomicBool,
    renderer: &'a R,
    typing: bool,
}

impl<'a, R: Renderer> ProcessingGuard<'a, R> {
    fn show_typing(&mut self) {
        self.renderer.typing(true);
        self.typing = true;
    }

    fn hide_typing(&mut self) {
        if self.typing {
            self.renderer.typing(false);
            self.typing = false;
        }
    }
}

impl<R: Renderer> Drop for ProcessingGuard<'_, R> {
    fn drop(&mut self) {
        self.hide_typing();
        self.flag.store(false, Ordering::Release);
    }
}

/// Submission boundary between the UI and the request manager. Nothing
/// here returns an error; every failure ends up as a notice.
pub struct ChatController<T, R> {
    manager: Mutex<RequestManager<T>>,
    renderer: R,
    transcript: StdMutex<Transcript>,
    processing: AtomicBool,
}

impl<T: Transport, R: Renderer> ChatController<T, R> {
    pub fn new(manager: RequestManager<T>, renderer: R) -> Self {
        Self {
            manager: Mutex::new(manager),
            renderer,
            transcript: StdMutex::new(Transcript::new()),
            processing: AtomicBool::new(false),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() || self.is_processing() {
            return SubmitOutcome::Ignored;
        }

        if let Err(reason) = validate_input(message) {
            tracing::debug!(%reason, "rejected input");
            self.renderer.error(&ErrorNotice {
                text: INVALID_INPUT_TEXT.to_string(),
                retry_text: None,
            });
            return SubmitOutcome::Rejected;
        }

        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::Ignored;
        }
        let mut guard = ProcessingGuard {
            flag: &self.processing,
            renderer: &self.renderer,
            typing: false,
        };

        self.renderer.clear_error();
        self.append(Message::new(MessageRole::User, message));
        guard.show_typing();

        let mut manager = self.manager.lock().await;
        let result = manager.send_message(message).await;
        guard.hide_typing();

        match result {
            Ok(reply) => {
                self.append(Message::new(MessageRole::Bot, reply.content.clone()));
                if let Some(questions) = reply.follow_up_questions.as_deref() {
                    if !questions.is_empty() {
                        self.renderer.follow_ups(questions);
                    }
                }
                SubmitOutcome::Answered(reply)
            }
            Err(error) => {
                tracing::error!(error = %error, "submission failed");
                let notice = self.describe(&error, &mut manager, message);
                self.renderer.error(&notice);
                SubmitOutcome::Failed(notice)
            }
        }
    }

    /// Resend exactly the text a failed submission carried.
    pub async fn retry(&self, text: &str) -> SubmitOutcome {
        self.renderer.clear_error();
        self.submit(text).await
    }

    pub async fn probe(&self) -> ConnectionStatus {
        self.renderer
            .status(ConnectionStatus::Connecting, "Establishing connection to Orian's realm...");

        let mut manager = self.manager.lock().await;
        let status = manager.probe_connection().await;
        match status {
            ConnectionStatus::Connected => {
                self.renderer.status(status, "Connected to Orian's realm");
            }
            _ => {
                self.renderer.status(status, "Connection failed - using offline mode");
                if !manager.session().is_online {
                    self.renderer.error(&ErrorNotice {
                        text: "You are offline. Reconnect before seeking counsel.".to_string(),
                        retry_text: None,
                    });
                }
            }
        }
        status
    }

    pub async fn set_online(&self, online: bool) -> ConnectionStatus {
        let status = self.manager.lock().await.set_online(online);
        let text = if online { "Reconnected to Orian's realm" } else { "Connection lost" };
        self.renderer.status(status, text);
        status
    }

    pub async fn session(&self) -> ClientSession {
        self.manager.lock().await.session().clone()
    }

    pub fn transcript(&self) -> Transcript {
        self.lock_transcript().clone()
    }

    /// Drop rendered messages. Session identifiers are untouched.
    pub fn clear(&self) {
        self.lock_transcript().clear();
    }

    /// Fresh session and empty transcript, as after a reload.
    pub async fn new_conversation(&self) {
        self.manager.lock().await.reset_session();
        self.clear();
    }

    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let conversation_id = self.session().await.conversation_id().to_string();
        let transcript = self.transcript();
        export_transcript(&transcript, &conversation_id, dir).await
    }

    fn append(&self, message: Message) {
        self.renderer.message(&message);
        self.lock_transcript().push(message);
    }

    fn lock_transcript(&self) -> std::sync::MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn describe(
        &self,
        error: &ClientError,
        manager: &mut RequestManager<T>,
        original: &str,
    ) -> ErrorNotice {
        let mut offer_retry = true;

        let detail = match error {
            ClientError::Timeout(_) => "Connection timed out. Please try again.",
            e if e.is_rate_limited() => {
                offer_retry = false;
                "Too many requests. Please wait before seeking counsel again."
            }
            ClientError::Server { status: 500 | 503, .. } => "King Orian is temporarily unavailable.",
            ClientError::Network(_) => {
                manager.mark_disconnected();
                self.renderer.status(ConnectionStatus::Disconnected, "Connection interrupted");
                "Connection lost. Check your internet connection."
            }
            _ => "Please try again, warrior.",
        };

        // The counter was already bumped for this failure.
        let within_budget = manager.session().retry_count <= manager.policy().max_retries;

        ErrorNotice {
            text: format!("{ERROR_PREFIX}{detail}"),
            retry_text: (offer_retry && within_budget).then(|| original.to_string()),
        }
    }
}

// src/client/export.rs
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use super::transcript::Transcript;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No conversation to export")]
    Empty,

    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),
}

pub fn render_transcript(transcript: &Transcript, conversation_id: &str) -> String {
    let mut out = String::from("King Orian Conversation Export\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    let _ = writeln!(out, "Exported: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Conversation ID: {conversation_id}\n");

    for msg in transcript.messages() {
        let _ = writeln!(out, "{} ({}):\n{}\n", msg.speaker, msg.time_label(), msg.content);
    }

    out.push_str("\n--- End of Conversation ---");
    out
}

/// Write the transcript to `king-orian-conversation-<date>.txt` under `dir`.
pub async fn export_transcript(
    transcript: &Transcript,
    conversation_id: &str,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, ExportError> {
    if transcript.is_empty() {
        return Err(ExportError::Empty);
    }

    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let file_name = format!("king-orian-conversation-{}.txt", Local::now().format("%Y-%m-%d"));
    let path = dir.join(file_name);
    tokio::fs::write(&path, render_transcript(transcript, conversation_id)).await?;

    tracing::info!(path = %path.display(), messages = transcript.len(), "conversation exported");
    Ok(path)
}

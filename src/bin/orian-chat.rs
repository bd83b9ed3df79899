//! Terminal front end for the King Orian relay.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use orian_chat::client::{
    ChatController, ClientSession, ConnectionStatus, ErrorNotice, HttpTransport, Renderer,
    RequestManager, SubmitOutcome,
    theme::{Theme, ThemeStore},
    transcript::Message,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orian-chat", about = "Seek counsel from King Orian")]
struct Args {
    /// Relay endpoint to POST messages to
    #[arg(long, default_value = "http://localhost:3000/chat")]
    endpoint: String,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, default_value_t = 5)]
    probe_timeout_secs: u64,

    /// Where the chosen theme is remembered
    #[arg(long, default_value = ".orian-theme")]
    theme_file: PathBuf,
}

struct TerminalRenderer {
    theme: Mutex<Theme>,
    last_failed: Mutex<Option<String>>,
}

impl TerminalRenderer {
    fn new(theme: Theme) -> Self {
        Self { theme: Mutex::new(theme), last_failed: Mutex::new(None) }
    }

    fn set_theme(&self, theme: Theme) {
        if let Ok(mut t) = self.theme.lock() {
            *t = theme;
        }
    }

    fn accent(&self) -> &'static str {
        match self.theme.lock().map(|t| *t).unwrap_or_default() {
            Theme::Dark => "\x1b[33m",
            Theme::Light => "\x1b[34m",
        }
    }

    fn take_retry(&self) -> Option<String> {
        self.last_failed.lock().ok().and_then(|mut s| s.take())
    }
}

impl Renderer for TerminalRenderer {
    fn message(&self, message: &Message) {
        println!("{}{} ({})\x1b[0m: {}", self.accent(), message.speaker, message.time_label(), message.content);
    }

    fn follow_ups(&self, questions: &[String]) {
        println!("  You might also ask:");
        for q in questions {
            println!("   - {q}");
        }
    }

    fn typing(&self, visible: bool) {
        if visible {
            println!("  King Orian is contemplating...");
        }
    }

    fn error(&self, notice: &ErrorNotice) {
        let hint = if notice.retry_text.is_some() { " (type /retry to resend)" } else { "" };
        eprintln!("\x1b[31m! {}{hint}\x1b[0m", notice.text);
        if let Ok(mut slot) = self.last_failed.lock() {
            *slot = notice.retry_text.clone();
        }
    }

    fn clear_error(&self) {
        if let Ok(mut slot) = self.last_failed.lock() {
            *slot = None;
        }
    }

    fn status(&self, status: ConnectionStatus, text: &str) {
        println!("  [{status}] {text}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let themes = ThemeStore::new(&args.theme_file);

    let manager = RequestManager::new(HttpTransport::new(&args.endpoint), ClientSession::new())
        .with_timeouts(
            Duration::from_secs(args.timeout_secs),
            Duration::from_secs(args.probe_timeout_secs),
        );
    let controller = ChatController::new(manager, TerminalRenderer::new(themes.current()));

    println!("King Orian awaits. /help lists commands.");
    controller.probe().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "/quit" | "/exit" => break,
            "/help" => println!(
                "/retry  /export [dir]  /theme  /clear  /new  /status  /online  /offline  /quit"
            ),
            "/retry" => match controller.renderer().take_retry() {
                Some(text) => {
                    controller.retry(&text).await;
                }
                None => println!("  Nothing to retry."),
            },
            "/export" => {
                let dir = if rest.trim().is_empty() { "." } else { rest.trim() };
                match controller.export(dir).await {
                    Ok(path) => println!("  Saved {}", path.display()),
                    Err(e) => eprintln!("! {e}"),
                }
            }
            "/theme" => {
                let theme = themes.toggle();
                controller.renderer().set_theme(theme);
                println!("  Theme: {theme}");
            }
            "/clear" => {
                controller.clear();
                println!("  Conversation cleared.");
            }
            "/new" => {
                controller.new_conversation().await;
                println!("  New conversation started.");
            }
            "/status" => {
                controller.probe().await;
            }
            "/online" => {
                controller.set_online(true).await;
            }
            "/offline" => {
                controller.set_online(false).await;
            }
            _ => {
                if let SubmitOutcome::Ignored = controller.submit(line).await {
                    tracing::debug!("submission ignored");
                }
            }
        }
    }

    Ok(())
}


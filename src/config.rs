// src/config.rs
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Settings for the upstream chat-completion service.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable consulted on every call when no explicit key is set.
    pub api_key_var: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_var: API_KEY_VAR.to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl CompletionConfig {
    /// Resolve the credential at invocation time.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var(&self.api_key_var).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub completion: CompletionConfig,
}

impl RelayConfig {
    /// Build from the process environment (after `.env` has been loaded).
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = env::var("ORIAN_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("ORIAN_BIND_ADDR is not a valid socket address")?;

        let static_dir = env::var("ORIAN_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        let timeout_secs = match env::var("ORIAN_UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("ORIAN_UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => 60,
        };

        let completion = CompletionConfig {
            base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            ..CompletionConfig::default()
        };

        Ok(Self { bind_addr, static_dir, completion })
    }
}

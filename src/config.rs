//! TOML configuration for the `perfbot` CLI and chat server.
//!
//! Every section is optional. A missing file is not an error for commands
//! that can run against the defaults; see [`Config::minimal`].

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::Path;

/// Environment variable consulted when `api.token` is not set.
pub const TOKEN_ENV: &str = "PERFBOT_API_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream performance-tracker backend.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token: Option<String>,
    /// Page size sent to `GET /employees`. Unset means the backend default page.
    #[serde(default)]
    pub employee_page_limit: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
            employee_page_limit: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    /// Bearer token from config, falling back to [`TOKEN_ENV`].
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// `chrono` strftime pattern for hire and review dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            date_format: default_date_format(),
        }
    }
}

fn default_greeting() -> String {
    "Hello! I'm your performance tracker assistant. I can help you find information about \
     employees, their performance records, and analytics. Try asking me something like \
     'Tell me about John Doe's performance' or 'What's the average rating for Engineering \
     department?'"
        .to_string()
}
fn default_date_format() -> String {
    "%-m/%-d/%Y".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5080".to_string()
}

impl Config {
    /// Defaults for every section, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::minimal`].
pub fn load_config_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    let url = reqwest::Url::parse(&config.api.base_url)
        .with_context(|| format!("api.base_url is not a valid URL: {}", config.api.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("api.base_url must be http or https, got '{}'", other),
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    if config.api.employee_page_limit == Some(0) {
        anyhow::bail!("api.employee_page_limit must be >= 1");
    }

    if config.chat.date_format.trim().is_empty() {
        anyhow::bail!("chat.date_format must not be empty");
    }
    if StrftimeItems::new(&config.chat.date_format).any(|item| matches!(item, Item::Error)) {
        anyhow::bail!(
            "chat.date_format is not a valid strftime pattern: '{}'",
            config.chat.date_format
        );
    }

    Ok(())
}

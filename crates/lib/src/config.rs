//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.slackdraw/config.json`) and environment.
//! Secrets (Slack bot token, image API key) are usually supplied through the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Slack Web API settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Image generation API settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Reply behaviour.
    #[serde(default)]
    pub bot: BotConfig,
}

/// Gateway bind, port, and webhook path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; Slack must be able to reach the events endpoint).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Path Slack POSTs events to (default "/slack/events").
    #[serde(default = "default_events_path")]
    pub events_path: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_events_path() -> String {
    "/slack/events".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            events_path: default_events_path(),
        }
    }
}

/// Slack Web API config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// Bot token (xoxb-...). Overridden by SLACK_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Web API base URL. Overridden by SLACK_API_BASE env; defaults to https://slack.com/api.
    pub api_base: Option<String>,
}

/// Image generation API config (OpenAI-compatible `/images/generations`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesConfig {
    /// API key. Overridden by OPENAI_API_KEY env when set.
    pub api_key: Option<String>,
    /// API base URL (default https://api.openai.com/v1).
    #[serde(default = "default_images_base_url")]
    pub base_url: String,
    /// Model id passed to the API (default "dall-e-3").
    #[serde(default = "default_images_model")]
    pub model: String,
    /// Image size (default "1024x1024").
    #[serde(default = "default_images_size")]
    pub size: String,
}

fn default_images_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_images_model() -> String {
    "dall-e-3".to_string()
}

fn default_images_size() -> String {
    "1024x1024".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_images_base_url(),
            model: default_images_model(),
            size: default_images_size(),
        }
    }
}

/// What the bot does with an actionable message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Generate an image from the message text and post its URL.
    #[default]
    Image,
    /// Post the message text back, prefixed with "Echo: ". No image API needed.
    Echo,
}

/// Reply settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    #[serde(default)]
    pub mode: ReplyMode,
    /// Reply text for image mode. `{url}` is replaced with the image URL, `{prompt}` with the message text.
    #[serde(default = "default_reply_template")]
    pub reply_template: String,
}

fn default_reply_template() -> String {
    "Here is your image for \"{prompt}\": {url}".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            mode: ReplyMode::default(),
            reply_template: default_reply_template(),
        }
    }
}

const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// Non-empty trimmed env var, if set.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_slack_token(config: &Config) -> Option<String> {
    env_non_empty("SLACK_BOT_TOKEN").or_else(|| trimmed(config.slack.bot_token.as_ref()))
}

/// Resolve the Slack Web API base: env SLACK_API_BASE, then config, then https://slack.com/api.
pub fn resolve_slack_api_base(config: &Config) -> String {
    env_non_empty("SLACK_API_BASE")
        .or_else(|| trimmed(config.slack.api_base.as_ref()))
        .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string())
}

/// Resolve the image API key: env OPENAI_API_KEY overrides config.
pub fn resolve_images_api_key(config: &Config) -> Option<String> {
    env_non_empty("OPENAI_API_KEY").or_else(|| trimmed(config.images.api_key.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SLACKDRAW_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".slackdraw").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (SLACKDRAW_CONFIG_PATH or ~/.slackdraw/config.json).
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

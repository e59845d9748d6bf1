use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the Telegram bot token
pub const TOKEN_VAR: &str = "TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub http: HttpConfig,
}

/// The two interchangeable image APIs, queried in order.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Endpoints {
    #[serde(default = "default_primary_endpoint")]
    pub primary: String,
    #[serde(default = "default_secondary_endpoint")]
    pub secondary: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    /// Label of the reply-keyboard button that requests a picture
    #[serde(default = "default_button_label")]
    pub button_label: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Messages {
    /// Greeting for /start; `{name}` is replaced with the sender's first name
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
    #[serde(default = "default_small_talk")]
    pub small_talk: String,
    #[serde(default = "default_apology")]
    pub apology: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            primary: default_primary_endpoint(),
            secondary: default_secondary_endpoint(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            button_label: default_button_label(),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            fallback_name: default_fallback_name(),
            small_talk: default_small_talk(),
            apology: default_apology(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_primary_endpoint() -> String {
    "https://api.thecatapi.com/v1/images/search".to_string()
}

fn default_secondary_endpoint() -> String {
    "https://api.thedogapi.com/v1/images/search".to_string()
}

fn default_button_label() -> String {
    "Подай котика!".to_string()
}

fn default_greeting() -> String {
    "Привет, {name}. Посмотри, какого котика я тебе нашёл!".to_string()
}

fn default_fallback_name() -> String {
    "друг".to_string()
}

fn default_small_talk() -> String {
    "К сожалению, я не умею общаться. Но зато мастерски ищу фотографии котиков.".to_string()
}

fn default_apology() -> String {
    "К сожалению, сервис на данный момент недоступен. Попробуйте обратиться позднее."
        .to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Messages {
    /// Render the /start greeting for the given sender.
    pub fn greeting_for(&self, name: Option<&str>) -> String {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.fallback_name);
        self.greeting.replace("{name}", name)
    }
}

impl HttpConfig {
    /// Upper bound for a single request attempt; zero disables the bound.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load the TOML config at `path`, falling back to built-in defaults
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.telegram.button_label.trim().is_empty() {
            anyhow::bail!("telegram.button_label must not be empty");
        }
        Ok(config)
    }
}

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::parser::ImageUrl;

/// A text message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub chat_id: i64,
    /// Display name of the sender, if the platform exposes one
    pub sender_name: Option<String>,
    /// The message text
    pub text: String,
    /// Whether the text is a bot command (`/start`, `/help@mybot`, ...)
    pub is_command: bool,
    /// Username of the receiving bot, used to match `/cmd@username` suffixes
    pub bot_username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Trigger,
    Other,
}

impl ChatEvent {
    /// Name of the command without the leading slash. Commands addressed
    /// to another bot (`/start@otherbot`) yield `None`.
    pub fn command(&self) -> Option<&str> {
        if !self.is_command {
            return None;
        }
        let head = self.text.split_whitespace().next()?.strip_prefix('/')?;
        match head.split_once('@') {
            None => Some(head),
            Some((name, addressee)) => {
                let ours = self.bot_username.as_deref()?;
                addressee.eq_ignore_ascii_case(ours).then_some(name)
            }
        }
    }

    pub fn kind(&self, trigger_label: &str) -> EventKind {
        if self.command() == Some("start") {
            EventKind::Start
        } else if self.text == trigger_label {
            EventKind::Trigger
        } else {
            EventKind::Other
        }
    }
}

/// Outbound primitives of a chat platform, scoped to one chat
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_image(&self, chat_id: i64, url: &ImageUrl) -> Result<()>;
}

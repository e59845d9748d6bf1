use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::{dptree, Bot, Message, Requester, ResponseResult, Update};
use teloxide::dispatching::{Dispatcher as UpdateDispatcher, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::payloads::SendMessageSetters;
use teloxide::types::{ChatId, InputFile, KeyboardButton, KeyboardMarkup, Me, MessageEntityKind};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::parser::ImageUrl;
use crate::platform::{ChatEvent, Gateway};

/// Commands shown in the Telegram command menu
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "прислать котика")]
    Start,
}

/// Telegram side of the [`Gateway`]: every text carries the one-button keyboard.
pub struct TelegramGateway {
    bot: Bot,
    keyboard: KeyboardMarkup,
}

impl TelegramGateway {
    pub fn new(bot: Bot, button_label: &str) -> Self {
        Self {
            bot,
            keyboard: reply_keyboard(button_label),
        }
    }
}

pub fn reply_keyboard(button_label: &str) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(button_label)]]).resize_keyboard()
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(self.keyboard.clone())
            .await
            .context("sendMessage failed")?;
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, url: &ImageUrl) -> Result<()> {
        let url = reqwest::Url::parse(url.as_str())
            .with_context(|| format!("Image URL is not usable: {}", url))?;
        self.bot
            .send_photo(ChatId(chat_id), InputFile::url(url))
            .await
            .context("sendPhoto failed")?;
        Ok(())
    }
}

/// Translate a Telegram message into a [`ChatEvent`]; non-text messages yield `None`.
fn to_chat_event(msg: &Message, me: &Me) -> Option<ChatEvent> {
    let text = msg.text()?.to_string();

    let is_command = msg
        .entities()
        .map(|entities| {
            entities
                .iter()
                .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
        })
        .unwrap_or(false);

    let sender_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .or_else(|| msg.chat.first_name().map(str::to_string));

    Some(ChatEvent {
        chat_id: msg.chat.id.0,
        sender_name,
        text,
        is_command,
        bot_username: me.user.username.clone(),
    })
}

/// Run the long-polling loop until Ctrl-C
pub async fn run(bot: Bot, dispatcher: Arc<Dispatcher>) -> Result<()> {
    info!("Starting Telegram platform...");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let gateway = Arc::new(TelegramGateway::new(bot.clone(), dispatcher.button_label()));

    let handler = Update::filter_message()
        .filter_map(|msg: Message, me: Me| to_chat_event(&msg, &me))
        .endpoint(handle_event);

    UpdateDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher, gateway])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_event(
    event: ChatEvent,
    dispatcher: Arc<Dispatcher>,
    gateway: Arc<TelegramGateway>,
) -> ResponseResult<()> {
    let outcome = dispatcher.handle(&event, gateway.as_ref()).await;
    info!("Chat {} handled: {:?}", event.chat_id, outcome);
    Ok(())
}

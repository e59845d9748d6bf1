use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Config, Messages};
use crate::fetcher::{FetchError, Fetcher, HttpClient};
use crate::parser::{parse_image_url, ParseError};
use crate::platform::{ChatEvent, EventKind, Gateway};

/// Why a picture could not be delivered
#[derive(Debug, Error)]
pub enum ImageFlowError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to send photo: {0:#}")]
    Delivery(anyhow::Error),
}

/// What the user ended up receiving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ImageSent,
    Apologized,
    Replied,
}

/// Maps inbound chat events to replies. Holds no per-chat state, so one
/// instance serves every chat concurrently.
pub struct Dispatcher {
    fetcher: Fetcher,
    messages: Messages,
    button_label: String,
}

impl Dispatcher {
    pub fn new(config: &Config, http: Arc<dyn HttpClient>) -> Self {
        Self {
            fetcher: Fetcher::new(http, config.endpoints.clone()),
            messages: config.messages.clone(),
            button_label: config.telegram.button_label.clone(),
        }
    }

    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    /// Handle one event end to end. Never fails: image-flow errors turn into
    /// an apology and send errors are only logged.
    pub async fn handle(&self, event: &ChatEvent, gateway: &dyn Gateway) -> Outcome {
        debug!("Received message \"{}\" in chat {}", event.text, event.chat_id);

        match event.kind(&self.button_label) {
            EventKind::Start => {
                let greeting = self.messages.greeting_for(event.sender_name.as_deref());
                self.reply(gateway, event.chat_id, &greeting).await;
                self.deliver_image(gateway, event.chat_id, "the /start command")
                    .await
            }
            EventKind::Trigger => {
                self.deliver_image(gateway, event.chat_id, "the button")
                    .await
            }
            EventKind::Other => {
                self.reply(gateway, event.chat_id, &self.messages.small_talk)
                    .await;
                Outcome::Replied
            }
        }
    }

    async fn deliver_image(&self, gateway: &dyn Gateway, chat_id: i64, cause: &str) -> Outcome {
        match self.image_flow(gateway, chat_id).await {
            Ok(()) => {
                info!("Sent picture to chat {} in response to {}", chat_id, cause);
                Outcome::ImageSent
            }
            Err(e) => {
                match &e {
                    ImageFlowError::Fetch(FetchError::EndpointUnavailable { endpoint, status }) => {
                        error!(
                            "No image API available for {} (last: {} answered {})",
                            cause, endpoint, status
                        );
                    }
                    ImageFlowError::Fetch(err @ FetchError::Transport { .. }) => {
                        error!("Image API unreachable for {}: {}", cause, err);
                    }
                    ImageFlowError::Parse(err) => {
                        error!("Image API returned an unusable payload for {}: {}", cause, err);
                    }
                    ImageFlowError::Delivery(err) => {
                        error!("Could not deliver picture for {}: {:#}", cause, err);
                    }
                }
                self.reply(gateway, chat_id, &self.messages.apology).await;
                Outcome::Apologized
            }
        }
    }

    async fn image_flow(&self, gateway: &dyn Gateway, chat_id: i64) -> Result<(), ImageFlowError> {
        let fetched = self.fetcher.fetch().await?;
        debug!("Parsing payload from {} ({})", fetched.endpoint, fetched.tier);
        let url = parse_image_url(&fetched.body)?;
        gateway
            .send_image(chat_id, &url)
            .await
            .map_err(ImageFlowError::Delivery)
    }

    async fn reply(&self, gateway: &dyn Gateway, chat_id: i64, text: &str) {
        match gateway.send_text(chat_id, text).await {
            Ok(()) => info!("Message \"{}\" sent to chat {}", text, chat_id),
            Err(e) => error!("Failed to send message \"{}\" to chat {}: {:#}", text, chat_id, e),
        }
    }
}

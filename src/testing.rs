//! In-process doubles for the HTTP client and the messaging gateway.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Endpoints;
use crate::fetcher::{HttpClient, HttpResponse};
use crate::parser::ImageUrl;
use crate::platform::Gateway;

pub const PRIMARY: &str = "http://primary.test/v1/images/search";
pub const SECONDARY: &str = "http://secondary.test/v1/images/search";

pub fn endpoints() -> Endpoints {
    Endpoints {
        primary: PRIMARY.to_string(),
        secondary: SECONDARY.to_string(),
    }
}

enum Reply {
    Status(u16, String),
    Unreachable,
}

/// Answers every GET to a URL with the same scripted reply and records the calls.
#[derive(Default)]
pub struct ScriptedHttp {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.replies
            .insert(url.to_string(), Reply::Status(status, body.to_string()));
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Unreachable);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.replies.get(url) {
            Some(Reply::Status(status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone().into_bytes(),
            }),
            Some(Reply::Unreachable) | None => anyhow::bail!("connection refused: {}", url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(i64, String),
    Image(i64, String),
}

/// Gateway that records what would have been sent to the chat.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
    fail_text: bool,
    fail_image: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_text() -> Self {
        Self {
            fail_text: true,
            ..Self::default()
        }
    }

    pub fn failing_image() -> Self {
        Self {
            fail_image: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail_text {
            anyhow::bail!("chat {} is blocked", chat_id);
        }
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Text(chat_id, text.to_string()));
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, url: &ImageUrl) -> Result<()> {
        if self.fail_image {
            anyhow::bail!("wrong file identifier/HTTP URL specified");
        }
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Image(chat_id, url.to_string()));
        Ok(())
    }
}

//! Telegram driver - Bot API webhook updates

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, InteractiveReply, Payload, Request};
use crate::domain::traits::{Driver, HttpClient, Target};

/// Telegram API base URL
pub const API_BASE: &str = "https://api.telegram.org";

const NAME: &str = "telegram";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup>,
}

#[derive(Serialize)]
struct ReplyMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

/// Telegram driver
pub struct TelegramDriver {
    http: Arc<dyn HttpClient>,
    token: String,
    api_url: String,
}

impl TelegramDriver {
    pub fn new(http: Arc<dyn HttpClient>, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            api_url: API_BASE.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API URL for a method
    fn api_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, token, method)
    }

    fn update(request: &Request) -> Option<Update> {
        if !request.has("update_id") {
            return None;
        }
        let update: Update = serde_json::from_value(request.body().clone()).ok()?;
        (update.message.is_some() || update.callback_query.is_some()).then_some(update)
    }

    fn build_request(payload: &Payload, chat_id: &str) -> SendMessageRequest {
        let reply_markup = match payload {
            Payload::Text(_) => None,
            Payload::Question(question) => Some(ReplyMarkup {
                inline_keyboard: vec![question
                    .buttons()
                    .iter()
                    .map(|b| InlineKeyboardButton {
                        text: b.text.clone(),
                        callback_data: b.value.clone(),
                    })
                    .collect()],
            }),
        };

        SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: payload.text().to_string(),
            reply_markup,
        }
    }
}

impl Driver for TelegramDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matches(&self, request: &Request) -> bool {
        Self::update(request).is_some()
    }

    fn messages(&self, request: &Request) -> Vec<IncomingMessage> {
        let Some(update) = Self::update(request) else {
            return Vec::new();
        };

        if let Some(query) = update.callback_query {
            let channel = query
                .message
                .as_ref()
                .map(|m| m.chat.id.to_string())
                .unwrap_or_default();
            let message = IncomingMessage::new(
                query.data.unwrap_or_default(),
                query.from.id.to_string(),
                channel,
            )
            .with_id(Some(query.id));
            return vec![message];
        }

        let Some(message) = update.message else {
            return Vec::new();
        };
        let is_bot = message.from.as_ref().is_some_and(|u| u.is_bot);
        let normalized = IncomingMessage::new(
            message.text.unwrap_or_default(),
            message.from.map(|u| u.id.to_string()).unwrap_or_default(),
            message.chat.id.to_string(),
        )
        .with_timestamp(message.date.map(|d| d.to_string()))
        .with_id(Some(message.message_id.to_string()));

        if is_bot {
            vec![normalized.from_bot()]
        } else {
            vec![normalized]
        }
    }

    fn is_bot(&self, request: &Request) -> bool {
        Self::update(request)
            .and_then(|u| u.message)
            .and_then(|m| m.from)
            .is_some_and(|u| u.is_bot)
    }

    fn user(&self, request: &Request) -> String {
        let Some(update) = Self::update(request) else {
            return String::new();
        };
        match (update.callback_query, update.message) {
            (Some(query), _) => query.from.id.to_string(),
            (None, Some(message)) => message.from.map(|u| u.id.to_string()).unwrap_or_default(),
            (None, None) => String::new(),
        }
    }

    fn channel(&self, request: &Request) -> String {
        let Some(update) = Self::update(request) else {
            return String::new();
        };
        update
            .callback_query
            .and_then(|q| q.message)
            .or(update.message)
            .map(|m| m.chat.id.to_string())
            .unwrap_or_default()
    }

    fn token(&self, _request: &Request) -> Option<String> {
        Some(self.token.clone())
    }

    fn interactive_reply(&self, request: &Request) -> Option<InteractiveReply> {
        let query = Self::update(request)?.callback_query?;
        Some(InteractiveReply {
            value: query.data.unwrap_or_default(),
            callback_id: Some(query.id),
        })
    }

    fn send(&self, payload: &Payload, target: &Target) -> Result<(), BotError> {
        let token = target.token.as_deref().unwrap_or(&self.token);
        let body = serde_json::to_value(Self::build_request(payload, &target.channel))
            .map_err(|e| BotError::Serialization(e.to_string()))?;

        tracing::debug!("Sending to {}: {}", target.channel, payload.text());
        let response = self.http.post_json(&self.api_url(token, "sendMessage"), &body)?;

        if !response.is_success() {
            return Err(BotError::send(NAME, format!("Telegram API error: {}", response.status)));
        }
        let body = response.json();
        if body.as_ref().and_then(|b| b.get("ok")).and_then(Value::as_bool) == Some(false) {
            let description = body
                .as_ref()
                .and_then(|b| b.get("description"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(BotError::send(NAME, description.to_string()));
        }
        Ok(())
    }
}

//! Slack driver - Events API messages and interactive button callbacks

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::application::errors::BotError;
use crate::domain::entities::request::value_to_string;
use crate::domain::entities::{IncomingMessage, InteractiveReply, Payload, Request};
use crate::domain::traits::{Driver, HttpClient, Target};

/// Slack Web API base URL
pub const API_BASE: &str = "https://slack.com/api";

const NAME: &str = "slack";

/// `event` object of an Events API envelope
///
/// Fields are read one by one: a mistyped field (object-valued `user` on
/// `user_change`, numeric `ts`) is dropped without losing its siblings.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub user: Option<String>,
    pub channel: Option<String>,
    pub text: Option<String>,
    pub ts: Option<String>,
    pub bot_id: Option<String>,
    pub client_msg_id: Option<String>,
}

impl Event {
    fn from_value(event: &Value) -> Self {
        let field = |name: &str| event.get(name).and_then(value_to_string);
        Self {
            user: field("user"),
            channel: field("channel"),
            text: field("text"),
            ts: field("ts"),
            // Any non-null marker counts, whatever its type
            bot_id: event
                .get("bot_id")
                .filter(|v| !v.is_null())
                .map(|v| value_to_string(v).unwrap_or_else(|| v.to_string())),
            client_msg_id: field("client_msg_id"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identity {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Action {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Decoded `payload` field of an interactive message callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractivePayload {
    pub token: Option<String>,
    pub callback_id: Option<String>,
    #[serde(default)]
    pub user: Identity,
    #[serde(default)]
    pub channel: Identity,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub action_ts: Option<String>,
    pub message_ts: Option<String>,
}

impl InteractivePayload {
    fn selected(&self) -> Option<&Action> {
        self.actions.first()
    }

    /// Value of the clicked action, its name when the button carries no value
    fn selected_value(&self) -> Option<String> {
        self.selected()
            .and_then(|a| a.value.clone().or_else(|| a.name.clone()))
    }
}

/// Slack driver
pub struct SlackDriver {
    http: Arc<dyn HttpClient>,
    token: Option<String>,
    api_url: String,
}

impl SlackDriver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            token: None,
            api_url: API_BASE.to_string(),
        }
    }

    /// Token used when the payload carries none
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    fn event(request: &Request) -> Option<Event> {
        request.get("event").filter(|v| v.is_object()).map(Event::from_value)
    }

    /// Interactive payloads arrive form-encoded as a JSON string
    fn interactive(request: &Request) -> Option<InteractivePayload> {
        let parsed = match request.get("payload")? {
            Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
            value @ Value::Object(_) => value.clone(),
            _ => return None,
        };
        if !parsed.get("actions").is_some_and(Value::is_array) {
            return None;
        }
        serde_json::from_value(parsed).ok()
    }

    fn check_response(status: u16, body: Option<Value>) -> Result<(), BotError> {
        if !(200..300).contains(&status) {
            return Err(BotError::send(NAME, format!("Slack API error: {}", status)));
        }
        let Some(body) = body else {
            return Ok(());
        };
        if body.get("ok").and_then(Value::as_bool) == Some(false) {
            let error = body.get("error").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(BotError::send(NAME, error.to_string()));
        }
        Ok(())
    }
}

impl Driver for SlackDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matches(&self, request: &Request) -> bool {
        Self::event(request).is_some() || Self::interactive(request).is_some()
    }

    fn messages(&self, request: &Request) -> Vec<IncomingMessage> {
        if let Some(payload) = Self::interactive(request) {
            let text = payload.selected_value().unwrap_or_default();
            let message = IncomingMessage::new(
                text,
                payload.user.id.clone().unwrap_or_default(),
                payload.channel.id.clone().unwrap_or_default(),
            )
            .with_timestamp(payload.action_ts.clone())
            .with_id(payload.message_ts.clone());
            return vec![message];
        }

        let Some(event) = Self::event(request) else {
            return Vec::new();
        };
        let message = IncomingMessage::new(
            event.text.unwrap_or_default(),
            event.user.unwrap_or_default(),
            event.channel.unwrap_or_default(),
        )
        .with_timestamp(event.ts)
        .with_id(event.client_msg_id);

        if event.bot_id.is_some() {
            vec![message.from_bot()]
        } else {
            vec![message]
        }
    }

    fn is_bot(&self, request: &Request) -> bool {
        Self::event(request).is_some_and(|e| e.bot_id.is_some())
    }

    fn user(&self, request: &Request) -> String {
        if let Some(payload) = Self::interactive(request) {
            return payload.user.id.unwrap_or_default();
        }
        Self::event(request).and_then(|e| e.user).unwrap_or_default()
    }

    fn channel(&self, request: &Request) -> String {
        if let Some(payload) = Self::interactive(request) {
            return payload.channel.id.unwrap_or_default();
        }
        Self::event(request).and_then(|e| e.channel).unwrap_or_default()
    }

    fn token(&self, request: &Request) -> Option<String> {
        request
            .str("token")
            .or_else(|| Self::interactive(request).and_then(|p| p.token))
            .or_else(|| self.token.clone())
    }

    fn interactive_reply(&self, request: &Request) -> Option<InteractiveReply> {
        let payload = Self::interactive(request)?;
        let value = payload.selected_value().unwrap_or_default();
        Some(InteractiveReply {
            value,
            callback_id: payload.callback_id,
        })
    }

    fn send(&self, payload: &Payload, target: &Target) -> Result<(), BotError> {
        let token = target
            .token
            .clone()
            .or_else(|| self.token.clone())
            .ok_or_else(|| BotError::send(NAME, "no token available"))?;

        let mut fields = vec![("token", token), ("channel", target.channel.clone())];
        match payload {
            Payload::Text(text) => fields.push(("text", text.clone())),
            Payload::Question(question) => {
                let attachments = question
                    .to_attachments_json()
                    .map_err(|e| BotError::Serialization(e.to_string()))?;
                fields.push(("text", String::new()));
                fields.push(("attachments", attachments));
            }
        }

        tracing::debug!("Sending to {}: {}", target.channel, payload.text());
        let response = self.http.post_form(&self.api_url("chat.postMessage"), &fields)?;
        Self::check_response(response.status, response.json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interactive_payload_accepts_object_or_string() {
        let inner = json!({
            "actions": [{ "name": "mood", "value": "great" }],
            "user": { "id": "U1" },
            "channel": { "id": "C1" }
        });
        let as_string = Request::from_form([("payload", inner.to_string())]);
        let as_object = Request::from_json(json!({ "payload": inner }));

        for request in [as_string, as_object] {
            let payload = SlackDriver::interactive(&request).unwrap();
            assert_eq!(payload.user.id.as_deref(), Some("U1"));
            assert_eq!(payload.selected().and_then(|a| a.value.as_deref()), Some("great"));
        }
    }

    #[test]
    fn test_payload_without_actions_is_not_interactive() {
        let request = Request::from_form([("payload", r#"{"user":{"id":"U1"}}"#)]);
        assert!(SlackDriver::interactive(&request).is_none());
    }

    #[test]
    fn test_event_fields_are_read_independently() {
        let event = Event::from_value(&json!({
            "bot_id": "B1",
            "channel": "general",
            "text": "loop",
            "ts": 1700000000.1,
            "user": { "id": "U1" }
        }));
        assert_eq!(event.bot_id.as_deref(), Some("B1"));
        assert_eq!(event.channel.as_deref(), Some("general"));
        assert_eq!(event.text.as_deref(), Some("loop"));
        assert_eq!(event.ts.as_deref(), Some("1700000000.1"));
        assert_eq!(event.user, None);
    }

    #[test]
    fn test_check_response() {
        assert!(SlackDriver::check_response(200, Some(json!({ "ok": true }))).is_ok());
        assert!(SlackDriver::check_response(200, None).is_ok());

        let err = SlackDriver::check_response(200, Some(json!({ "ok": false, "error": "channel_not_found" })))
            .unwrap_err();
        assert!(err.to_string().contains("channel_not_found"));

        assert!(SlackDriver::check_response(500, None).is_err());
    }
}

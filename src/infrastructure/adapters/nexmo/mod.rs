//! Nexmo driver - Inbound SMS webhooks

use std::sync::Arc;

use serde_json::Value;

use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, Payload, Request};
use crate::domain::traits::{Driver, HttpClient, Target};

/// Nexmo REST API base URL
pub const API_BASE: &str = "https://rest.nexmo.com";

const NAME: &str = "nexmo";

/// Fields every inbound SMS webhook carries
const REQUIRED_FIELDS: [&str; 3] = ["msisdn", "to", "messageId"];

/// Nexmo SMS driver
///
/// The user is the sender's number (`msisdn`) and the channel is the number the
/// message was sent to (`to`); replies go from the channel back to the user.
pub struct NexmoDriver {
    http: Arc<dyn HttpClient>,
    api_key: String,
    api_secret: String,
    api_url: String,
}

impl NexmoDriver {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_url: API_BASE.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn timestamp(request: &Request) -> Option<String> {
        request
            .str("message-timestamp")
            .or_else(|| request.str("message_timestamp"))
    }

    /// Each entry in `messages` reports its own status; "0" is success
    fn check_response(status: u16, body: Option<Value>) -> Result<(), BotError> {
        if !(200..300).contains(&status) {
            return Err(BotError::send(NAME, format!("Nexmo API error: {}", status)));
        }
        let failed = body
            .as_ref()
            .and_then(|b| b.get("messages"))
            .and_then(Value::as_array)
            .and_then(|messages| {
                messages.iter().find(|m| {
                    m.get("status").and_then(Value::as_str).is_some_and(|s| s != "0")
                })
            });
        match failed {
            Some(message) => {
                let error = message
                    .get("error-text")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                Err(BotError::send(NAME, error.to_string()))
            }
            None => Ok(()),
        }
    }
}

impl Driver for NexmoDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn matches(&self, request: &Request) -> bool {
        REQUIRED_FIELDS.iter().all(|field| request.has(field))
    }

    fn messages(&self, request: &Request) -> Vec<IncomingMessage> {
        let message = IncomingMessage::new(
            request.str("text").unwrap_or_default(),
            self.user(request),
            self.channel(request),
        )
        .with_timestamp(Self::timestamp(request))
        .with_id(request.str("messageId"));
        vec![message]
    }

    /// SMS carries no bot marker
    fn is_bot(&self, _request: &Request) -> bool {
        false
    }

    fn user(&self, request: &Request) -> String {
        request.str("msisdn").unwrap_or_default()
    }

    fn channel(&self, request: &Request) -> String {
        request.str("to").unwrap_or_default()
    }

    fn token(&self, _request: &Request) -> Option<String> {
        Some(self.api_key.clone())
    }

    fn send(&self, payload: &Payload, target: &Target) -> Result<(), BotError> {
        let fields = vec![
            ("api_key", self.api_key.clone()),
            ("api_secret", self.api_secret.clone()),
            ("from", target.channel.clone()),
            ("to", target.user.clone()),
            ("text", payload.text().to_string()),
        ];

        tracing::debug!("Sending SMS from {} to {}", target.channel, target.user);
        let url = format!("{}/sms/json", self.api_url);
        let response = self.http.post_form(&url, &fields)?;
        Self::check_response(response.status, response.json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_response_reports_failed_status() {
        let ok = json!({ "message-count": "1", "messages": [{ "status": "0" }] });
        assert!(NexmoDriver::check_response(200, Some(ok)).is_ok());

        let failed = json!({ "messages": [{ "status": "2", "error-text": "Missing to param" }] });
        let err = NexmoDriver::check_response(200, Some(failed)).unwrap_err();
        assert!(err.to_string().contains("Missing to param"));
    }

    #[test]
    fn test_timestamp_accepts_both_spellings() {
        let dashed = Request::from_form([("message-timestamp", "2016-11-30 19:27:46")]);
        let underscored = Request::from_form([("message_timestamp", "2016-11-30 19:27:46")]);
        assert_eq!(NexmoDriver::timestamp(&dashed).as_deref(), Some("2016-11-30 19:27:46"));
        assert_eq!(NexmoDriver::timestamp(&underscored).as_deref(), Some("2016-11-30 19:27:46"));
    }
}

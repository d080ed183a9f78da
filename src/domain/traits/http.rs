use serde_json::Value;

use crate::application::errors::BotError;

/// Response of an outbound platform API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as JSON, `None` when it isn't
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Outbound HTTP boundary used by drivers to reach platform APIs
pub trait HttpClient: Send + Sync {
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse, BotError>;
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, BotError>;
}

use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, InteractiveReply, Payload, Request};

/// Driver trait - adapter between one platform's webhook shape and the normalized model
///
/// Every inspection method is a pure function of the request and must not fail on
/// malformed input: missing fields yield `false`, empty strings or `None`.
pub trait Driver: Send + Sync {
    /// Stable driver name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether the request carries this platform's identifying fields
    fn matches(&self, request: &Request) -> bool;

    /// Normalize the request; single-message payloads yield one element
    fn messages(&self, request: &Request) -> Vec<IncomingMessage>;

    /// Whether the request was produced by a bot
    fn is_bot(&self, request: &Request) -> bool;

    /// Sender identity, empty when absent
    fn user(&self, request: &Request) -> String;

    /// Channel identity, empty when absent
    fn channel(&self, request: &Request) -> String;

    /// Token needed to send replies for this request
    fn token(&self, request: &Request) -> Option<String>;

    /// Selected option when the request is a button/action callback
    fn interactive_reply(&self, _request: &Request) -> Option<InteractiveReply> {
        None
    }

    /// Deliver a payload through the platform's outbound API. Not retried.
    fn send(&self, payload: &Payload, target: &Target) -> Result<(), BotError>;
}

/// Where a reply goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub channel: String,
    pub user: String,
    pub token: Option<String>,
}

impl Target {
    pub fn new(channel: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

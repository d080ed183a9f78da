use serde::{Deserialize, Serialize};

/// Platform-independent shape of one inbound message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Empty when the message came from a bot
    pub text: String,
    pub user: String,
    pub channel: String,
    pub is_bot: bool,
    /// Driver bookkeeping only, never used for matching
    pub timestamp: Option<String>,
    pub id: Option<String>,
}

impl IncomingMessage {
    pub fn new(text: impl Into<String>, user: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user: user.into(),
            channel: channel.into(),
            ..Self::default()
        }
    }

    /// Mark as bot-originated; the text is dropped so handlers never see it
    pub fn from_bot(mut self) -> Self {
        self.is_bot = true;
        self.text.clear();
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

use super::IncomingMessage;

/// Selected option of an interactive (button) callback
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractiveReply {
    pub value: String,
    pub callback_id: Option<String>,
}

/// What a resumed conversation receives from the next user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    message: IncomingMessage,
    interactive: Option<InteractiveReply>,
}

impl Answer {
    pub fn from_message(message: IncomingMessage) -> Self {
        Self {
            message,
            interactive: None,
        }
    }

    pub fn from_interactive(message: IncomingMessage, reply: InteractiveReply) -> Self {
        Self {
            message,
            interactive: Some(reply),
        }
    }

    /// Free text, or the selected value for interactive replies
    pub fn text(&self) -> &str {
        match &self.interactive {
            Some(reply) => &reply.value,
            None => &self.message.text,
        }
    }

    pub fn is_interactive_reply(&self) -> bool {
        self.interactive.is_some()
    }

    pub fn value(&self) -> Option<&str> {
        self.interactive.as_ref().map(|r| r.value.as_str())
    }

    pub fn callback_id(&self) -> Option<&str> {
        self.interactive.as_ref().and_then(|r| r.callback_id.as_deref())
    }

    pub fn message(&self) -> &IncomingMessage {
        &self.message
    }
}

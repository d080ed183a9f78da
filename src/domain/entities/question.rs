use serde::{Deserialize, Serialize};

/// Button attached to a [`Question`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub name: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Button {
    /// A button whose name and value default to its label
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: text.clone(),
            value: text.clone(),
            text,
            kind: "button".to_string(),
            image_url: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Prompt plus an ordered set of buttons, rendered as a structured attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    pub actions: Vec<Button>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fallback: text.clone(),
            text,
            callback_id: None,
            actions: Vec::new(),
        }
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.actions.push(button);
        self
    }

    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.actions.extend(buttons);
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_callback_id(mut self, id: impl Into<String>) -> Self {
        self.callback_id = Some(id.into());
        self
    }

    pub fn buttons(&self) -> &[Button] {
        &self.actions
    }

    /// Canonical attachment serialization: a one-element attachment list
    pub fn to_attachments_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&[self])
    }
}

/// What a handler hands to `respond`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Question(Question),
}

impl Payload {
    /// Plain-text rendering; a question degrades to its prompt
    pub fn text(&self) -> &str {
        match self {
            Payload::Text(text) => text,
            Payload::Question(question) => &question.text,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Question> for Payload {
    fn from(question: Question) -> Self {
        Payload::Question(question)
    }
}

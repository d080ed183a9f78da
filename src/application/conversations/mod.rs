//! Conversations - Multi-turn dialogue that survives between webhook deliveries
//!
//! A conversation suspends by storing its own serialized state together with a
//! [`Continuation`]: the name of a registered step plus bound arguments. The next
//! inbound message from the same user and channel deserializes the state and
//! invokes that step with an [`Answer`](crate::domain::entities::Answer).

pub mod registry;
pub mod store;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::messaging::context::Context;
use crate::application::messaging::dispatcher::HandlerResult;

pub use registry::{ConversationRegistry, Step, StepError};
pub use store::{ConversationStore, StoredConversation};

/// A user-defined unit of dialogue state
///
/// The dispatcher context is handed in for the duration of each call and is never
/// part of the serialized state.
pub trait Conversation: Serialize + DeserializeOwned + Send + 'static {
    /// Registry key; must stay stable while entries may still be stored
    const KIND: &'static str;

    /// Start the conversation. Usually asks something and suspends.
    fn run(&mut self, bot: &mut Context<'_>) -> HandlerResult;
}

/// Reference to "what to run next" when a conversation resumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    pub step: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Continuation {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Serialized conversation tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub kind: String,
    pub state: Value,
}

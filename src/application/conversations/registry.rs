//! Conversation registry - Maps (kind, step name) to resumable step functions

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::Conversation;
use crate::application::errors::BotError;
use crate::application::messaging::context::Context;
use crate::application::messaging::dispatcher::HandlerResult;
use crate::domain::entities::Answer;

/// Why a resumed step did not complete
#[derive(Debug)]
pub enum StepError {
    /// Stored state no longer deserializes into the conversation type; the step never ran
    Decode(String),
    /// The step ran and failed
    Failed(BotError),
}

/// Type-erased step: deserializes the conversation state and runs the step on it
pub type Step = Arc<dyn Fn(Value, &mut Context<'_>, Answer, &[Value]) -> Result<(), StepError> + Send + Sync>;

/// Registry of continuation steps, keyed by conversation kind then step name
#[derive(Default)]
pub struct ConversationRegistry {
    steps: HashMap<&'static str, HashMap<String, Step>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `step` as a resumable continuation of conversation `C`
    pub fn register<C, F>(&mut self, name: &str, step: F)
    where
        C: Conversation,
        F: Fn(&mut C, &mut Context<'_>, Answer, &[Value]) -> HandlerResult + Send + Sync + 'static,
    {
        let erased: Step = Arc::new(
            move |state: Value, bot: &mut Context<'_>, answer: Answer, args: &[Value]| {
                let mut conversation: C = serde_json::from_value(state)
                    .map_err(|e| StepError::Decode(format!("{}: {}", C::KIND, e)))?;
                step(&mut conversation, bot, answer, args).map_err(StepError::Failed)
            },
        );

        let steps = self.steps.entry(C::KIND).or_default();
        if steps.insert(name.to_string(), erased).is_some() {
            tracing::warn!("Replaced continuation {}::{}", C::KIND, name);
        }
    }

    pub fn get(&self, kind: &str, step: &str) -> Option<&Step> {
        self.steps.get(kind)?.get(step)
    }

    pub fn contains(&self, kind: &str, step: &str) -> bool {
        self.get(kind, step).is_some()
    }

    /// Registered step names for a conversation kind
    pub fn steps_of(&self, kind: &str) -> Vec<&str> {
        self.steps
            .get(kind)
            .map(|steps| steps.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.steps.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

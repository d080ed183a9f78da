//! Per-request context handed to handlers and conversation steps

use super::dispatcher::HandlerResult;
use super::matcher::Matches;
use crate::application::conversations::{
    Continuation, Conversation, ConversationRegistry, ConversationState, ConversationStore,
};
use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, Payload};
use crate::domain::traits::{Driver, Target};

/// State of one inbound message while it is being dispatched
///
/// Borrowed from the [`Dispatcher`](super::Dispatcher) for the lifetime of a single
/// request; nothing here outlives the webhook call.
pub struct Context<'a> {
    driver: &'a dyn Driver,
    store: &'a ConversationStore,
    registry: &'a ConversationRegistry,
    message: IncomingMessage,
    matches: Matches,
    token: Option<String>,
    suspended: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        driver: &'a dyn Driver,
        store: &'a ConversationStore,
        registry: &'a ConversationRegistry,
        message: IncomingMessage,
        token: Option<String>,
    ) -> Self {
        Self {
            driver,
            store,
            registry,
            message,
            matches: Matches::default(),
            token,
            suspended: false,
        }
    }

    pub fn message(&self) -> &IncomingMessage {
        &self.message
    }

    /// Captures of the pattern that selected the current handler
    pub fn matches(&self) -> &Matches {
        &self.matches
    }

    pub fn user(&self) -> &str {
        &self.message.user
    }

    pub fn channel(&self) -> &str {
        &self.message.channel
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Reply in the inbound channel
    pub fn respond(&self, payload: impl Into<Payload>) -> HandlerResult {
        let channel = self.message.channel.clone();
        self.respond_to(payload, &channel)
    }

    /// Reply in an explicit channel
    pub fn respond_to(&self, payload: impl Into<Payload>, channel: &str) -> HandlerResult {
        let payload = payload.into();
        let target = Target::new(channel, self.message.user.as_str()).with_token(self.token.clone());
        tracing::debug!("[{}] Responding via {}", channel, self.driver.name());

        self.driver.send(&payload, &target).map_err(|e| {
            tracing::error!("[{}] Send failed: {}", channel, e);
            e
        })
    }

    /// Run a conversation once, synchronously, within this request
    pub fn start_conversation<C: Conversation>(&mut self, mut conversation: C) -> HandlerResult {
        tracing::info!("[{}] Starting conversation {}", self.message.channel, C::KIND);
        conversation.run(self)
    }

    /// Suspend `conversation` until the next message from this user and channel
    pub fn store_conversation<C: Conversation>(&mut self, conversation: &C, next: Continuation) -> HandlerResult {
        if !self.registry.contains(C::KIND, &next.step) {
            return Err(BotError::UnknownContinuation {
                kind: C::KIND.to_string(),
                step: next.step,
            });
        }

        let state = serde_json::to_value(conversation)
            .map_err(|e| BotError::Serialization(format!("{}: {}", C::KIND, e)))?;
        self.store.store(
            &self.message.user,
            &self.message.channel,
            ConversationState {
                kind: C::KIND.to_string(),
                state,
            },
            next,
        )?;
        self.suspended = true;
        Ok(())
    }

    /// Drop any suspended conversation for this user and channel
    pub fn clear_conversation(&mut self) -> HandlerResult {
        self.store.clear(&self.message.user, &self.message.channel)?;
        self.suspended = false;
        Ok(())
    }

    pub(crate) fn set_matches(&mut self, matches: Matches) {
        self.matches = matches;
    }

    /// Whether a conversation was stored during this request
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub(crate) fn reset_suspended(&mut self) {
        self.suspended = false;
    }
}

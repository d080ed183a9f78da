//! Message dispatcher - Routes inbound webhooks to conversations and handlers

use std::sync::Arc;

use serde_json::Value;

use super::context::Context;
use super::matcher::{LiteralMode, Pattern};
use crate::application::conversations::{Conversation, ConversationRegistry, ConversationStore, StepError};
use crate::application::errors::{BotError, StorageError};
use crate::domain::entities::{Answer, IncomingMessage, InteractiveReply, Request};
use crate::domain::traits::Driver;

/// Handler function type; receives placeholder captures positionally
pub type Handler = Arc<dyn Fn(&mut Context<'_>, &[String]) -> HandlerResult + Send + Sync>;

/// Handler result
pub type HandlerResult = Result<(), BotError>;

/// What happened to one normalized message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Bot-originated; nothing ran
    BotSuppressed,
    /// A stored conversation continued
    Resumed { kind: String, step: String },
    /// The handler registered for `pattern` ran
    Matched { pattern: String },
    /// No handler for this text
    Unmatched,
}

/// Message dispatcher - drivers, pattern handlers and conversation steps
///
/// Registration happens once at startup; [`Dispatcher::handle`] only takes `&self`
/// so one instance can serve concurrent requests.
pub struct Dispatcher {
    drivers: Vec<Arc<dyn Driver>>,
    handlers: Vec<(Pattern, Handler)>,
    conversations: ConversationRegistry,
    store: ConversationStore,
    literal_mode: LiteralMode,
}

impl Dispatcher {
    pub fn new(store: ConversationStore) -> Self {
        Self {
            drivers: Vec::new(),
            handlers: Vec::new(),
            conversations: ConversationRegistry::new(),
            store,
            literal_mode: LiteralMode::default(),
        }
    }

    /// Add a driver; earlier drivers win when several match
    pub fn with_driver<D: Driver + 'static>(mut self, driver: D) -> Self {
        self.register_driver(Arc::new(driver));
        self
    }

    pub fn register_driver(&mut self, driver: Arc<dyn Driver>) {
        tracing::debug!("Registered driver {}", driver.name());
        self.drivers.push(driver);
    }

    /// How patterns without placeholders compare; affects later `hears` calls
    pub fn with_literal_mode(mut self, mode: LiteralMode) -> Self {
        self.literal_mode = mode;
        self
    }

    /// Register a handler for a `{placeholder}` pattern
    pub fn hears<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, BotError>
    where
        F: Fn(&mut Context<'_>, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        let pattern = Pattern::compile(pattern, self.literal_mode)?;
        self.handlers.push((pattern, Arc::new(handler)));
        Ok(self)
    }

    /// Register a resumable step of conversation `C`
    pub fn register_step<C, F>(&mut self, name: &str, step: F) -> &mut Self
    where
        C: Conversation,
        F: Fn(&mut C, &mut Context<'_>, Answer, &[Value]) -> HandlerResult + Send + Sync + 'static,
    {
        self.conversations.register::<C, F>(name, step);
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn conversations(&self) -> &ConversationRegistry {
        &self.conversations
    }

    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.name()).collect()
    }

    /// First registered driver recognizing the request
    pub fn resolve_driver(&self, request: &Request) -> Result<&dyn Driver, BotError> {
        self.drivers
            .iter()
            .find(|d| d.matches(request))
            .map(|d| d.as_ref())
            .ok_or(BotError::NoDriverMatched)
    }

    /// Context for the first message of a request, for responding outside a handler
    pub fn context(&self, request: &Request) -> Result<Context<'_>, BotError> {
        let driver = self.resolve_driver(request)?;
        let message = driver.messages(request).into_iter().next().unwrap_or_else(|| {
            IncomingMessage::new("", driver.user(request), driver.channel(request))
        });
        Ok(Context::new(
            driver,
            &self.store,
            &self.conversations,
            message,
            driver.token(request),
        ))
    }

    /// Process one webhook delivery
    pub fn handle(&self, request: &Request) -> Result<Vec<Outcome>, BotError> {
        let driver = self.resolve_driver(request)?;
        tracing::debug!("Request matched driver {}", driver.name());

        if driver.is_bot(request) {
            tracing::debug!("Ignoring bot message on {}", driver.name());
            return Ok(vec![Outcome::BotSuppressed]);
        }

        let token = driver.token(request);
        let interactive = driver.interactive_reply(request);
        let mut outcomes = Vec::new();

        for message in driver.messages(request) {
            if message.is_bot {
                outcomes.push(Outcome::BotSuppressed);
                continue;
            }

            let mut ctx = Context::new(
                driver,
                &self.store,
                &self.conversations,
                message,
                token.clone(),
            );

            if let Some(outcome) = self.resume(&mut ctx, interactive.clone())? {
                outcomes.push(outcome);
                continue;
            }
            outcomes.push(self.dispatch(&mut ctx)?);
        }

        Ok(outcomes)
    }

    /// Continue a stored conversation, `None` when nothing is in flight
    fn resume(&self, ctx: &mut Context<'_>, interactive: Option<InteractiveReply>) -> Result<Option<Outcome>, BotError> {
        let stored = match self.store.retrieve(ctx.user(), ctx.channel()) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!("[{}] Discarding unreadable conversation: {}", ctx.channel(), e);
                ctx.clear_conversation()?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let kind = stored.conversation.kind;
        let step_name = stored.next.step;
        let Some(step) = self.conversations.get(&kind, &step_name) else {
            tracing::warn!("[{}] No continuation {}::{}, discarding", ctx.channel(), kind, step_name);
            ctx.clear_conversation()?;
            return Ok(None);
        };

        let answer = match interactive {
            Some(reply) => Answer::from_interactive(ctx.message().clone(), reply),
            None => Answer::from_message(ctx.message().clone()),
        };

        tracing::info!("[{}] Resuming {}::{}", ctx.channel(), kind, step_name);
        ctx.reset_suspended();
        match step(stored.conversation.state, &mut *ctx, answer, &stored.next.args) {
            Ok(()) => {}
            Err(StepError::Decode(e)) => {
                tracing::warn!("[{}] Discarding undecodable conversation state: {}", ctx.channel(), e);
                ctx.clear_conversation()?;
                return Ok(None);
            }
            Err(StepError::Failed(e)) => return Err(e),
        }

        if ctx.is_suspended() {
            tracing::debug!("[{}] Conversation {} suspended again", ctx.channel(), kind);
        } else {
            ctx.clear_conversation()?;
            tracing::debug!("[{}] Conversation {} finished", ctx.channel(), kind);
        }

        Ok(Some(Outcome::Resumed { kind, step: step_name }))
    }

    /// Run the first handler whose pattern matches the message text
    fn dispatch(&self, ctx: &mut Context<'_>) -> Result<Outcome, BotError> {
        let text = ctx.message().text.clone();

        for (pattern, handler) in &self.handlers {
            let Some(matches) = pattern.captures(&text) else {
                continue;
            };
            let args = matches.values();
            ctx.set_matches(matches);
            handler(&mut *ctx, &args)?;
            return Ok(Outcome::Matched {
                pattern: pattern.source().to_string(),
            });
        }

        tracing::debug!("[{}] No handler for message", ctx.channel());
        Ok(Outcome::Unmatched)
    }
}

//! Provider-agnostic chatbot dispatch.
//!
//! Drivers normalize platform webhooks into [`IncomingMessage`]s, the
//! [`Dispatcher`] resumes suspended conversations or runs the first handler whose
//! `{placeholder}` pattern matches, and handlers reply through the originating
//! driver.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::conversations::{Continuation, Conversation, ConversationStore};
pub use application::errors::{BotError, ConfigError, PatternError, StorageError};
pub use application::messaging::{Context, Dispatcher, HandlerResult, LiteralMode, Matches, Outcome, Pattern};
pub use domain::entities::{Answer, Button, IncomingMessage, InteractiveReply, Payload, Question, Request};
pub use domain::traits::{Cache, Driver, HttpClient, HttpResponse, Target};

//! Application layer errors

use thiserror::Error;

/// General dispatch errors
#[derive(Error, Debug)]
pub enum BotError {
    /// No registered driver recognizes the inbound payload
    #[error("No driver matched the incoming request")]
    NoDriverMatched,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Send failed via {driver}: {reason}")]
    Send { driver: &'static str, reason: String },

    /// Raised by application handlers and conversation steps
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("No continuation '{step}' registered for conversation '{kind}'")]
    UnknownContinuation { kind: String, step: String },

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BotError {
    pub fn handler(msg: impl Into<String>) -> Self {
        BotError::Handler(msg.into())
    }

    pub fn send(driver: &'static str, reason: impl Into<String>) -> Self {
        BotError::Send {
            driver,
            reason: reason.into(),
        }
    }
}

/// Pattern compilation errors
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Empty pattern")]
    Empty,

    #[error("Duplicate placeholder '{{{0}}}'")]
    DuplicatePlaceholder(String),

    #[error("Invalid expression: {0}")]
    Invalid(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

//! Application layer - Dispatch and conversation state
//! 
//! This layer contains:
//! - Errors: Crate-wide error taxonomy
//! - Messaging: Pattern matching, dispatching, per-request context
//! - Conversations: Continuation registry and cache-backed store

pub mod conversations;
pub mod errors;
pub mod messaging;

//! Message handling - Driver resolution, pattern dispatch and replies

pub mod context;
pub mod dispatcher;
pub mod matcher;

pub use context::Context;
pub use dispatcher::{Dispatcher, Handler, HandlerResult, Outcome};
pub use matcher::{LiteralMode, Matches, Pattern};

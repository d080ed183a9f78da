//! Domain entities - Core message model shared by every driver

pub mod answer;
pub mod message;
pub mod question;
pub mod request;

pub use answer::{Answer, InteractiveReply};
pub use message::IncomingMessage;
pub use question::{Button, Payload, Question};
pub use request::Request;

//! Platform drivers

pub mod nexmo;
pub mod slack;
pub mod telegram;

pub use nexmo::NexmoDriver;
pub use slack::SlackDriver;
pub use telegram::TelegramDriver;

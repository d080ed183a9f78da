//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage / Database: Cache backends (in-memory, SQLite)
//! - Http: Outbound API clients
//! - Adapters: Platform drivers (Slack, Nexmo, Telegram)
//! - Setup: Dispatcher wiring from configuration

pub mod adapters;
pub mod config;
pub mod database;
pub mod http;
pub mod setup;
pub mod storage;

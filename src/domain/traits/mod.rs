//! Domain traits - Abstractions for infrastructure implementations

pub mod cache;
pub mod driver;
pub mod http;

pub use cache::Cache;
pub use driver::{Driver, Target};
pub use http::{HttpClient, HttpResponse};

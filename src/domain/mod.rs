//! Domain layer - Core message model and infrastructure abstractions
//! 
//! This layer contains:
//! - Entities: Request, IncomingMessage, Answer, Question
//! - Traits: Driver, Cache, HttpClient

pub mod entities;
pub mod traits;

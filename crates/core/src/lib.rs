//! Core logic including the agent exchange, tool protocol, decoders and
//! retries.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
pub mod decoder;
mod error;
mod model_client;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentMetadata, AgentOutput};
pub use error::Error;

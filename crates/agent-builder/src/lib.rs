//! Build agents that exchange messages with a language model, call tools
//! through a plain-text protocol and decode the final answer into typed
//! data.
//!
//! The crate includes a CLI demo for using in the terminal. And you can
//! also use it as a library, assembling an [`Agent`] from a model
//! provider, a decoder and some tools:
//!
//! ```no_run
//! use agent_builder::tools::CalculatorTool;
//! use agent_builder::{AgentBuilder, Message};
//! use agent_builder::openai::{OpenAIConfigBuilder, OpenAIProvider};
//!
//! # async fn run() -> Result<(), agent_builder::Error> {
//! let config = OpenAIConfigBuilder::with_api_key("sk-...").build();
//! let agent = AgentBuilder::with_model_provider(OpenAIProvider::new(config))
//!     .with_tool(CalculatorTool::new())
//!     .build()?;
//! let output = agent
//!     .execute(vec![Message::user("What is 4 + 4 * 4?")], None)
//!     .await?;
//! println!("{}", output.data);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod json_agent;
pub mod tools;

pub use agent_builder_core::decoder::{
    Decoder, JsonSchemaDecoder, PlainTextDecoder,
};
pub use agent_builder_core::prompt::{AgentInput, PromptTemplate};
pub use agent_builder_core::retry::RetryConfig;
pub use agent_builder_core::{
    Agent, AgentBuilder, AgentMetadata, AgentOutput, Error,
};
pub use agent_builder_model::{
    ExecutionParams, Generation, Message, ModelProvider, Role, Usage,
};
pub use json_agent::JsonConversionAgent;

/// Re-exports of [`agent_builder_core`] crate.
pub mod core {
    pub use agent_builder_core::*;
}

/// Re-exports of [`agent_builder_model`] crate.
pub mod model {
    pub use agent_builder_model::*;
}

/// Re-exports of [`agent_builder_google_model`] crate.
pub mod google {
    pub use agent_builder_google_model::*;
}

/// Re-exports of [`agent_builder_openai_model`] crate.
pub mod openai {
    pub use agent_builder_openai_model::*;
}

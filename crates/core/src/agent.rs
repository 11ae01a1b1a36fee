mod builder;
mod output;
#[cfg(test)]
mod tests;

use agent_builder_model::{ExecutionParams, Generation, Message};
use chrono::Utc;
use tracing::Instrument;

pub use builder::AgentBuilder;
pub use output::{AgentMetadata, AgentOutput};

use crate::Error;
use crate::conversation::Conversation;
use crate::decoder::{Decoder, PlainTextDecoder};
use crate::model_client::ModelClient;
use crate::prompt::AgentInput;
use crate::retry::{RetryConfig, with_retry};
use crate::tool::Executor as ToolExecutor;

/// An agent instance, which runs one exchange with a model per
/// [`execute`](Agent::execute) call.
///
/// An exchange injects the system instructions, generates a message, runs
/// at most one tool round (followed by a second generation), and decodes
/// the final text. The agent holds no per-call state, so concurrent calls
/// on the same instance are independent.
pub struct Agent<D: Decoder = PlainTextDecoder> {
    model_client: ModelClient,
    decoder: D,
    tool_executor: Option<ToolExecutor>,
    retry_config: RetryConfig,
    instructions: String,
}

struct Attempt<T> {
    generation: Generation,
    data: T,
    tool_name: Option<String>,
}

impl<D: Decoder> Agent<D> {
    /// Returns the system instructions injected into every conversation.
    #[inline]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Returns the retry configuration.
    #[inline]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Executes one exchange.
    ///
    /// With a retry config allowing more than one attempt, any failure
    /// restarts the exchange from a fresh copy of the input, and running
    /// out of attempts yields [`Error::Internal`] wrapping the last error.
    /// Tools may therefore run more than once per call.
    pub async fn execute(
        &self,
        input: impl Into<AgentInput>,
        params: Option<&ExecutionParams>,
    ) -> Result<AgentOutput<D::Output>, Error> {
        let start_time = Utc::now();
        let messages = input.into().into_messages();
        let context_id = params.and_then(|p| p.context_id.as_deref());
        let span = debug_span!("agent execute", context_id = ?context_id);

        let result = with_retry(&self.retry_config, || {
            self.attempt(&messages, params)
                .instrument(debug_span!("agent attempt"))
        })
        .instrument(span)
        .await;
        let end_time = Utc::now();

        let attempt = match result {
            Ok(attempt) => attempt,
            Err(err) if self.retry_config.max_attempts > 1 => {
                return Err(Error::Internal {
                    attempts: self.retry_config.max_attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        };

        let Generation { generated, usage } = attempt.generation;
        Ok(AgentOutput {
            generated,
            usage,
            data: attempt.data,
            metadata: AgentMetadata {
                decoder: self.decoder.name().to_owned(),
                tool: attempt.tool_name,
                start_time,
                end_time,
            },
        })
    }

    async fn attempt(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> Result<Attempt<D::Output>, Error> {
        let mut conversation = Conversation::from(messages.to_vec());
        conversation.validate()?;
        conversation.inject_instructions(&self.instructions);

        debug!("first generation");
        let mut generation = self
            .model_client
            .generate(conversation.messages(), params)
            .await?;

        let mut tool_name = None;
        let round = match &self.tool_executor {
            Some(executor) => executor.run(&generation.generated.content).await,
            None => None,
        };
        if let Some(round) = round {
            debug!("tool round finished, second generation");
            conversation.push(Message::assistant(
                generation.generated.content.clone(),
            ));
            conversation.push(Message::tool(round.output));
            tool_name = round.tool_name;
            generation = self
                .model_client
                .generate(conversation.messages(), params)
                .await?;
        }

        let data = self.decoder.decode(&generation.generated.content).await?;
        Ok(Attempt {
            generation,
            data,
            tool_name,
        })
    }
}

/// Joins the tool instructions and the decoder instructions, in this order.
pub(crate) fn compile_instructions(
    tool_executor: Option<&ToolExecutor>,
    decoder: &impl Decoder,
) -> String {
    let parts = [
        tool_executor.map(ToolExecutor::instructions),
        decoder.instructions(),
    ];
    let parts: Vec<String> = parts
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    parts.join("\n").trim().to_owned()
}

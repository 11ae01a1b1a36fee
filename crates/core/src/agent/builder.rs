use agent_builder_model::ModelProvider;

use super::{Agent, compile_instructions};
use crate::Error;
use crate::decoder::{Decoder, PlainTextDecoder};
use crate::model_client::ModelClient;
use crate::retry::RetryConfig;
use crate::tool::{
    AnyTool, Executor as ToolExecutor, SlashCommandSyntax, Tool,
    ToolCallSyntax, ToolObject,
};

/// [`Agent`] builder.
pub struct AgentBuilder<D = PlainTextDecoder> {
    pub(crate) model_client: ModelClient,
    pub(crate) decoder: D,
    pub(crate) tools: Vec<Box<dyn ToolObject>>,
    pub(crate) tool_call_syntax: Box<dyn ToolCallSyntax>,
    pub(crate) retry_config: RetryConfig,
}

impl AgentBuilder<PlainTextDecoder> {
    /// Creates a new builder with the specified model provider.
    ///
    /// The agent decodes plain text and makes a single attempt unless
    /// configured otherwise.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            decoder: PlainTextDecoder,
            tools: vec![],
            tool_call_syntax: Box::new(SlashCommandSyntax),
            retry_config: RetryConfig::default(),
        }
    }
}

impl<D: Decoder> AgentBuilder<D> {
    /// Replaces the decoder.
    #[inline]
    pub fn with_decoder<E: Decoder>(self, decoder: E) -> AgentBuilder<E> {
        AgentBuilder {
            model_client: self.model_client,
            decoder,
            tools: self.tools,
            tool_call_syntax: self.tool_call_syntax,
            retry_config: self.retry_config,
        }
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Replaces the syntax the model uses to request tools.
    #[inline]
    pub fn with_tool_call_syntax<S: ToolCallSyntax>(mut self, syntax: S) -> Self {
        self.tool_call_syntax = Box::new(syntax);
        self
    }

    /// Sets the retry configuration.
    #[inline]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Builds the agent.
    ///
    /// Fails if the retry configuration is invalid, a tool name is used
    /// twice, or a tool schema does not compile.
    pub fn build(self) -> Result<Agent<D>, Error> {
        let AgentBuilder {
            model_client,
            decoder,
            tools,
            tool_call_syntax,
            retry_config,
        } = self;

        retry_config.validate()?;
        let tool_executor = if tools.is_empty() {
            None
        } else {
            Some(ToolExecutor::with_tools(tools, tool_call_syntax)?)
        };
        let instructions =
            compile_instructions(tool_executor.as_ref(), &decoder);
        trace!("compiled instructions: {instructions}");

        Ok(Agent {
            model_client,
            decoder,
            tool_executor,
            retry_config,
            instructions,
        })
    }
}

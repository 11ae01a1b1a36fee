use agent_builder_core::decoder::JsonSchemaDecoder;
use agent_builder_core::{Agent, AgentBuilder, AgentOutput, Error};
use agent_builder_model::{ExecutionParams, Message, ModelProvider};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

const INSTRUCTIONS: &str = "You convert the user's text into JSON. Extract \
    the information the text contains and do not invent values that are \
    not there.";

/// An agent that converts free text into structured data of type `T`.
pub struct JsonConversionAgent<T: DeserializeOwned + Send + 'static> {
    agent: Agent<JsonSchemaDecoder<T>>,
}

impl<T> JsonConversionAgent<T>
where
    T: DeserializeOwned + JsonSchema + Send + 'static,
{
    /// Creates an agent whose output schema is derived from `T`.
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Result<Self, Error> {
        Self::with_decoder(provider, JsonSchemaDecoder::for_type()?)
    }
}

impl<T> JsonConversionAgent<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Creates an agent that validates the output against `schema`.
    pub fn with_schema<P: ModelProvider + 'static>(
        provider: P,
        schema: Value,
    ) -> Result<Self, Error> {
        Self::with_decoder(provider, JsonSchemaDecoder::new(schema)?)
    }

    fn with_decoder<P: ModelProvider + 'static>(
        provider: P,
        decoder: JsonSchemaDecoder<T>,
    ) -> Result<Self, Error> {
        let agent = AgentBuilder::with_model_provider(provider)
            .with_decoder(decoder)
            .build()?;
        Ok(Self { agent })
    }

    /// Converts `text` into `T`.
    pub async fn execute(
        &self,
        text: &str,
        params: Option<&ExecutionParams>,
    ) -> Result<AgentOutput<T>, Error> {
        debug!("converting {} bytes of text", text.len());
        let messages = vec![Message::system(INSTRUCTIONS), Message::user(text)];
        self.agent.execute(messages, params).await
    }
}

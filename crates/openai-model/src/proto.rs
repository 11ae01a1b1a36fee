use agent_builder_model::{ErrorKind, Generation, Message as ModelMessage, Role, Usage};
use serde::{Deserialize, Serialize};

use crate::config::SamplingParams;
use crate::{Error, OpenAIConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<CompletionUsage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Message {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(flatten)]
    params: SamplingParams,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    messages: &[ModelMessage],
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: messages.iter().map(create_message).collect(),
        params: config.params.clone(),
    }
}

/// Tool output has no role of its own in a text-only conversation, it is
/// sent as a named system message.
#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    let (role, name) = match msg.role {
        Role::Tool => ("system", Some("tool")),
        role => (role.as_str(), None),
    };
    Message {
        role,
        content: msg.content.clone(),
        name,
    }
}

pub fn parse_response(
    completion: ChatCompletion,
    config: &OpenAIConfig,
) -> Result<Generation, Error> {
    let Some(message) = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
    else {
        return Err(Error::new(
            "Invalid or empty chat completion response",
            ErrorKind::MalformedResponse,
        ));
    };

    let generation =
        Generation::from_text(message.content.unwrap_or_default());
    Ok(match completion.usage {
        Some(usage) => generation.with_usage(Usage {
            model: config.model.clone(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
        None => generation,
    })
}

use agent_builder_model::{
    ErrorKind, Generation, Message as ModelMessage, Role, Usage,
};
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::{Error, GoogleAIConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub model_version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

// ------------------------------------
// Types shared by requests and replies
// ------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

// -----------
// Conversions
// -----------

/// Builds the request body. System messages become the system instruction,
/// the rest become contents.
pub fn create_request(
    messages: &[ModelMessage],
    config: &GoogleAIConfig,
) -> Result<GenerateContentRequest, Error> {
    let (system, rest): (Vec<_>, Vec<_>) =
        messages.iter().partition(|msg| msg.role == Role::System);
    if rest.is_empty() {
        return Err(Error::new(
            "System instruction provided but no prompt provided",
            ErrorKind::Other,
        ));
    }

    let system_instruction = (!system.is_empty()).then(|| Content {
        parts: system.iter().map(|msg| text_part(&msg.content)).collect(),
        role: None,
    });
    Ok(GenerateContentRequest {
        contents: rest.into_iter().map(create_content).collect(),
        system_instruction,
        generation_config: config.generation_config.clone(),
    })
}

#[inline]
fn text_part(text: &str) -> Part {
    Part {
        text: text.to_owned(),
    }
}

/// Gemini only knows `user` and `model`, tool output is sent as user text.
#[inline]
fn create_content(msg: &ModelMessage) -> Content {
    let role = match msg.role {
        Role::Assistant => "model",
        _ => "user",
    };
    Content {
        parts: vec![text_part(&msg.content)],
        role: Some(role.to_owned()),
    }
}

pub fn parse_response(
    response: GenerateContentResponse,
    config: &GoogleAIConfig,
) -> Result<Generation, Error> {
    let Some(content) = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
    else {
        return Err(Error::new(
            "Gemini response is empty",
            ErrorKind::MalformedResponse,
        ));
    };

    let text: String = content.parts.into_iter().map(|part| part.text).collect();
    let generation = Generation::from_text(text);
    Ok(match response.usage_metadata {
        Some(usage) => generation.with_usage(Usage {
            model: response
                .model_version
                .unwrap_or_else(|| config.model.clone()),
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }),
        None => generation,
    })
}

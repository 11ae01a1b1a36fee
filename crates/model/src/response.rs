use serde::{Deserialize, Serialize};

use crate::request::Message;

/// Token accounting reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// The model that served the request.
    pub model: String,
    /// Tokens consumed by the input messages.
    pub input_tokens: u64,
    /// Tokens produced by the model.
    pub output_tokens: u64,
    /// Total tokens billed for the request.
    pub total_tokens: u64,
}

/// A response from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Generation {
    /// The generated message.
    pub generated: Message,
    /// Usage metadata, if the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Generation {
    /// Creates a generation holding an assistant message and no usage.
    #[inline]
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self {
            generated: Message::assistant(text),
            usage: None,
        }
    }

    /// Attaches usage metadata.
    #[inline]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

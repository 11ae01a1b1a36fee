use std::fmt::Debug;
use std::time::Duration;

use serde::Serialize;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

/// Generation settings sent as `generationConfig`.
///
/// Unset fields are omitted from the request body.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sequences that stop the generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound of generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Nucleus sampling probability mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Number of candidate tokens considered at each step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// Builder for [`GoogleAIConfig`].
#[derive(Clone, PartialEq)]
pub struct GoogleAIConfigBuilder {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    generation_config: GenerationConfig,
    timeout: Option<Duration>,
}

impl GoogleAIConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            generation_config: GenerationConfig::default(),
            timeout: None,
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL, the part before `/<model>:generateContent`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replaces the generation settings.
    #[inline]
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// Sets the sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of generated tokens.
    #[inline]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.generation_config.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Sets a per-request timeout.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> GoogleAIConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        GoogleAIConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            base_url: base_url.trim_end_matches('/').to_owned(),
            generation_config: self.generation_config,
            timeout: self.timeout,
        }
    }
}

impl Debug for GoogleAIConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAIConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("generation_config", &self.generation_config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuration for the Gemini provider.
#[derive(Clone, PartialEq)]
pub struct GoogleAIConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) generation_config: GenerationConfig,
    pub(crate) timeout: Option<Duration>,
}

impl GoogleAIConfig {
    /// Returns the model name.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the `generateContent` endpoint of the configured model.
    #[inline]
    pub fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

impl Debug for GoogleAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAIConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("generation_config", &self.generation_config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

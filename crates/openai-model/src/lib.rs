//! A model provider for OpenAI-compatible chat completion APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use agent_builder_model::{
    ErrorKind, ExecutionParams, Generation, Message, ModelProvider,
    ModelProviderError,
};
use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};

pub use config::{OpenAIConfig, OpenAIConfigBuilder, SamplingParams};
use proto::ChatCompletion;

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection
        } else if err.is_decode() {
            ErrorKind::MalformedResponse
        } else if let Some(status) = err.status() {
            kind_for_status(status)
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::InvalidCredentials
        }
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ErrorKind::Timeout
        }
        _ => ErrorKind::Other,
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    fn generate(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> impl Future<Output = Result<Generation, Self::Error>> + Send + 'static
    {
        let config = Arc::clone(&self.config);
        let openai_req = proto::create_request(messages, &config);
        let context_id = params.and_then(|p| p.context_id.clone());

        let mut req = self
            .client
            .post(format!("{}/chat/completions", config.base_url))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", config.api_key),
            )
            .header(header::ACCEPT, "application/json");
        for (name, value) in &config.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }
        let resp_fut = req.json(&openai_req).send();

        async move {
            if config.api_key.is_empty() {
                return Err(Error::new(
                    "API key is required",
                    ErrorKind::InvalidCredentials,
                ));
            }
            trace!(context_id = ?context_id, "sending chat completion request");

            let resp = resp_fut.await.and_then(Response::error_for_status)?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype() == mime::JSON)
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::MalformedResponse,
                ));
            }

            let completion: ChatCompletion = resp.json().await?;
            let generation = proto::parse_response(completion, &config)?;
            trace!("got completion: {}", generation.generated.content);
            Ok(generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_kinds() {
        assert_eq!(
            kind_for_status(StatusCode::UNAUTHORIZED),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(
            kind_for_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorKind::RateLimitExceeded
        );
        assert_eq!(
            kind_for_status(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::Other
        );
    }

    #[tokio::test]
    async fn test_empty_api_key() {
        let provider =
            OpenAIProvider::new(OpenAIConfigBuilder::with_api_key("").build());
        let err = provider
            .generate(&[Message::user("Hi")], None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }
}

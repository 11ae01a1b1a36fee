//! A model provider for Google's Gemini `generateContent` API.

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
use reqwest::{Client, StatusCode, header};

pub use config::{GenerationConfig, GoogleAIConfig, GoogleAIConfigBuilder};
use proto::{ErrorResponse, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Error type for [`GoogleAIProvider`].
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

/// Builds an error from a non-success reply, keeping the server's message
/// when the body carries one.
fn status_error(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|resp| resp.error.message)
        .unwrap_or_else(|_| body.trim().to_owned());
    Error::new(
        format!("Gemini API returned an error: {status} {detail}"),
        kind_for_status(status),
    )
}

/// Gemini model provider.
#[derive(Clone, Debug)]
pub struct GoogleAIProvider {
    client: Client,
    config: Arc<GoogleAIConfig>,
}

impl GoogleAIProvider {
    /// Creates a new `GoogleAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: GoogleAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for GoogleAIProvider {
    type Error = Error;

    fn generate(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> impl Future<Output = Result<Generation, Self::Error>> + Send + 'static
    {
        let config = Arc::clone(&self.config);
        let context_id = params.and_then(|p| p.context_id.clone());
        let prepared = if config.api_key.is_empty() {
            Err(Error::new(
                "API key is required",
                ErrorKind::InvalidCredentials,
            ))
        } else {
            proto::create_request(messages, &config).map(|body| {
                let mut req = self
                    .client
                    .post(config.endpoint())
                    .header(API_KEY_HEADER, config.api_key.as_str())
                    .header(header::ACCEPT, "application/json")
                    .json(&body);
                if let Some(timeout) = config.timeout {
                    req = req.timeout(timeout);
                }
                req.send()
            })
        };

        async move {
            let resp_fut = prepared?;
            trace!(context_id = ?context_id, "sending generateContent request");

            let resp = resp_fut.await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(status_error(status, &body));
            }

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

            let response: GenerateContentResponse = resp.json().await?;
            let generation = proto::parse_response(response, &config)?;
            trace!("got content: {}", generation.generated.content);
            Ok(generation)
        }
    }
}

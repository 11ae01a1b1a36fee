use std::error::Error as StdError;

use agent_builder_model::{ErrorKind as ModelErrorKind, ModelProviderError};
use thiserror::Error;

use crate::decoder;

/// Errors that can surface from an agent.
///
/// Failures inside a tool round are never reported here, they are fed
/// back to the model as tool output instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The input conversation or the agent configuration is malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A JSON schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    SchemaCompilation(String),

    /// The final generation could not be decoded.
    #[error(transparent)]
    Decode(#[from] decoder::Error),

    /// The model provider failed.
    #[error("model provider failed ({kind}): {source}")]
    Provider {
        /// The kind reported by the provider.
        kind: ModelErrorKind,
        /// The provider's own error.
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Every attempt of a retried execution failed.
    #[error("agent execution failed after {attempts} attempts")]
    Internal {
        /// The number of attempts made.
        attempts: u32,
        /// The error of the last attempt.
        source: Box<Error>,
    },
}

impl Error {
    #[inline]
    pub(crate) fn provider<E: ModelProviderError>(err: E) -> Self {
        Self::Provider {
            kind: err.kind(),
            source: Box::new(err),
        }
    }

    /// Returns the innermost error, looking through [`Error::Internal`].
    pub fn root(&self) -> &Error {
        match self {
            Error::Internal { source, .. } => source.root(),
            _ => self,
        }
    }

    /// Returns the provider error kind if a model provider caused this
    /// error.
    #[inline]
    pub fn provider_kind(&self) -> Option<ModelErrorKind> {
        match self.root() {
            Error::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the decode error kind if decoding caused this error.
    #[inline]
    pub fn decode_kind(&self) -> Option<decoder::ErrorKind> {
        match self.root() {
            Error::Decode(err) => Some(err.kind()),
            _ => None,
        }
    }
}

use std::error::Error;

use crate::error::ErrorKind;
use crate::request::{ExecutionParams, Message};
use crate::response::Generation;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which turns a conversation
/// into one generated message.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
///
/// Timeouts are the provider's business. A provider that gives up waiting
/// should report it with [`ErrorKind::Timeout`].
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Generates the next message for the conversation.
    ///
    /// The returned future must not borrow from `self` or the arguments.
    fn generate(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> impl Future<Output = Result<Generation, Self::Error>> + Send + 'static;
}

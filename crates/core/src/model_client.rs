use std::pin::Pin;
use std::sync::Arc;

use agent_builder_model::{ExecutionParams, Generation, Message, ModelProvider};
use tracing::Instrument;

use crate::Error;

type GenerateResult = Result<Generation, Error>;
type BoxedGenerateFuture = Pin<Box<dyn Future<Output = GenerateResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(&[Message], Option<&ExecutionParams>) -> BoxedGenerateFuture
        + Send + Sync
>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(
            move |messages: &[Message], params: Option<&ExecutionParams>| {
                trace!("got a request: {messages:?}");
                let fut = provider.generate(messages, params);
                Box::pin(
                    async move {
                        match fut.await {
                            Ok(generation) => {
                                trace!("got a generation: {generation:?}");
                                Ok(generation)
                            }
                            Err(err) => {
                                error!("got an error: {err:?}");
                                Err(Error::provider(err))
                            }
                        }
                    }
                    .instrument(trace_span!("model client req")),
                ) as BoxedGenerateFuture
            },
        );
        Self { handler_fn }
    }

    /// Generates the next message for the conversation.
    #[inline]
    pub async fn generate(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> GenerateResult {
        (self.handler_fn)(messages, params).await
    }
}

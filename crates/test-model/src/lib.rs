//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use agent_builder_model::{
    ErrorKind, ExecutionParams, Generation, Message, ModelProvider,
    ModelProviderError, Role,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Error {
    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

struct ScriptStep {
    preset: PresetResponse,
    failed: u64,
}

#[derive(Default)]
struct State {
    script: Vec<ScriptStep>,
    requests: Vec<Recorded>,
}

/// A request captured by [`TestModelProvider`].
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    /// The messages sent to the model.
    pub messages: Vec<Message>,
    /// The execution parameters sent to the model.
    pub params: Option<ExecutionParams>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script,
/// which is how the model should respond to a request. The step is
/// selected by the number of assistant messages already present in the
/// request, so the first generation of an exchange always gets the first
/// step and the generation after a tool round gets the second one, no
/// matter how many times the exchange is retried. If there are no enough
/// steps in the script, an error will be returned.
///
/// Clones share the script and the recorded requests, so a test can keep
/// one clone for inspection after handing the other to an agent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    state: Arc<Mutex<State>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.lock().script.push(ScriptStep { preset, failed: 0 });
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, in order.
    #[inline]
    pub fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    /// Returns the number of requests received so far.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> Result<Generation, Error> {
        let mut state = self.lock();
        state.requests.push(Recorded {
            messages: messages.to_vec(),
            params: params.cloned(),
        });

        let step_idx = messages
            .iter()
            .filter(|msg| msg.role == Role::Assistant)
            .count();
        let Some(step) = state.script.get_mut(step_idx) else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };

        match step.preset.failures {
            Some(0) => Err(Error {
                message: "preset failure",
                kind: step.preset.failure_kind,
            }),
            Some(failures) if step.failed < failures => {
                step.failed += 1;
                Err(Error {
                    message: "preset failure",
                    kind: step.preset.failure_kind,
                })
            }
            _ => Ok(step.preset.to_generation()),
        }
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn generate(
        &self,
        messages: &[Message],
        params: Option<&ExecutionParams>,
    ) -> impl Future<Output = Result<Generation, Self::Error>> + Send + 'static
    {
        let result = self.respond(messages, params);
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        async move {
            sleep(delay).await;
            result
        }
    }
}

use agent_builder_model::{ErrorKind, Generation, Usage};

/// The preset response for one assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PresetResponse {
    /// The generated text.
    pub content: String,
    /// Usage reported with the response.
    pub usage: Option<Usage>,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
    /// The kind of the injected failures.
    pub failure_kind: ErrorKind,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified text.
    #[inline]
    pub fn with_text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            usage: None,
            failures: None,
            failure_kind: ErrorKind::RateLimitExceeded,
        }
    }

    /// Attaches usage metadata to the response.
    #[inline]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Sets the kind of the injected failures.
    #[inline]
    pub fn with_failure_kind(mut self, kind: ErrorKind) -> Self {
        self.failure_kind = kind;
        self
    }

    pub(crate) fn to_generation(&self) -> Generation {
        Generation {
            generated: agent_builder_model::Message::assistant(
                self.content.clone(),
            ),
            usage: self.usage.clone(),
        }
    }
}

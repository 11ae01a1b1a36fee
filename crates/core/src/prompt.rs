//! Reusable prompt templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use agent_builder_model::Message;
use regex::{Captures, Regex};

use crate::conversation::Conversation;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid")
});

/// A conversation with `{{variable}}` placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptTemplate {
    parts: Vec<Message>,
}

impl PromptTemplate {
    /// Creates a template from its messages.
    #[inline]
    pub fn new(parts: impl Into<Vec<Message>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// Returns the raw template messages.
    #[inline]
    pub fn parts(&self) -> &[Message] {
        &self.parts
    }

    /// Replaces every `{{ key }}` with its variable.
    ///
    /// Whitespace around the key is ignored. Placeholders without a
    /// matching variable are kept as `{{key}}`.
    pub fn format<V: AsRef<str>>(
        &self,
        variables: &HashMap<String, V>,
    ) -> Vec<Message> {
        self.parts
            .iter()
            .map(|part| {
                let content =
                    PLACEHOLDER.replace_all(&part.content, |caps: &Captures| {
                        let key = caps[1].trim();
                        match variables.get(key) {
                            Some(value) => value.as_ref().to_owned(),
                            None => format!("{{{{{key}}}}}"),
                        }
                    });
                Message::new(part.role, content)
            })
            .collect()
    }

    /// Binds variables to the template, producing an agent input that is
    /// formatted right before execution.
    #[inline]
    pub fn bind(self, variables: HashMap<String, String>) -> AgentInput {
        AgentInput::Template {
            template: self,
            variables,
        }
    }
}

/// What an agent can execute: either ready messages or a template that
/// still needs formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentInput {
    /// A ready conversation.
    Messages(Vec<Message>),
    /// A template and its variables.
    Template {
        /// The template.
        template: PromptTemplate,
        /// Values for the placeholders.
        variables: HashMap<String, String>,
    },
}

impl AgentInput {
    pub(crate) fn into_messages(self) -> Vec<Message> {
        match self {
            AgentInput::Messages(messages) => messages,
            AgentInput::Template {
                template,
                variables,
            } => template.format(&variables),
        }
    }
}

impl From<Vec<Message>> for AgentInput {
    #[inline]
    fn from(messages: Vec<Message>) -> Self {
        AgentInput::Messages(messages)
    }
}

impl From<&[Message]> for AgentInput {
    #[inline]
    fn from(messages: &[Message]) -> Self {
        AgentInput::Messages(messages.to_vec())
    }
}

impl From<Conversation> for AgentInput {
    #[inline]
    fn from(conversation: Conversation) -> Self {
        AgentInput::Messages(conversation.into_messages())
    }
}

impl From<PromptTemplate> for AgentInput {
    #[inline]
    fn from(template: PromptTemplate) -> Self {
        template.bind(HashMap::new())
    }
}

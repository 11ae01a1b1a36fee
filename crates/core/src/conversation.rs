//! Conversation-related types.

use agent_builder_model::{Message, Role};

use crate::Error;

/// Represents a conversation, the literal transcript sent to the model.
///
/// The order of messages is meaningful. An agent works on its own copy of
/// the conversation for each attempt and never keeps it afterwards.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub(crate) messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    #[inline]
    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// Returns the messages in order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consumes the conversation and returns its messages.
    #[inline]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Checks that the conversation can be sent to a model: it must not be
    /// empty and every message must carry some content.
    pub fn validate(&self) -> Result<(), Error> {
        if self.messages.is_empty() {
            return Err(Error::Validation(
                "conversation must contain at least one message".to_owned(),
            ));
        }
        for (idx, msg) in self.messages.iter().enumerate() {
            if msg.content.is_empty() {
                return Err(Error::Validation(format!(
                    "message {idx} ({}) has empty content",
                    msg.role
                )));
            }
        }
        Ok(())
    }

    /// Merges system instructions into the conversation.
    ///
    /// The instructions are appended to the first system message, or
    /// become a new system message at the front if there is none. Empty
    /// instructions leave the conversation untouched.
    pub fn inject_instructions(&mut self, instructions: &str) {
        if instructions.is_empty() {
            return;
        }
        let system_msg = self
            .messages
            .iter_mut()
            .find(|msg| msg.role == Role::System);
        match system_msg {
            Some(msg) => {
                msg.content.push('\n');
                msg.content.push_str(instructions);
            }
            None => self.messages.insert(0, Message::system(instructions)),
        }
    }
}

impl From<Vec<Message>> for Conversation {
    #[inline]
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

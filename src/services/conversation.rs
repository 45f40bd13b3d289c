use crate::models::{Message, Origin};

/// Append-only message log
///
/// Messages are never edited or removed individually; `clear` drops the whole
/// session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    greeting: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that opens with (and resets to) an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![Message::assistant(greeting.clone())],
            greeting: Some(greeting),
        }
    }

    pub fn push(&mut self, origin: Origin, text: impl Into<String>) -> Message {
        let message = Message::new(origin, text);
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        if let Some(greeting) = &self.greeting {
            self.messages.push(Message::assistant(greeting.clone()));
        }
    }
}

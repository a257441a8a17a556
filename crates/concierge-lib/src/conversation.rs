//! Append-only conversation log.

use concierge_core::types::{Message, Role};

/// Chronological message log for one session. Messages are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a log with the assistant's greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut log = Self::default();
        if !greeting.trim().is_empty() {
            log.push(Message::assistant(greeting));
        }
        log
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
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

    /// Most recent message from `role`.
    pub fn last_from(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }
}

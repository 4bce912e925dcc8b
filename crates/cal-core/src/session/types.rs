//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Represents a conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier (client-supplied or server-generated)
    pub id: String,
    /// Conversation turns, oldest first
    pub messages: Vec<Message>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with the given id
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the session
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Inject the system policy as the first turn of an empty session.
    ///
    /// A session carries at most one system turn, always first. Calling this
    /// on a session with prior history is a no-op.
    pub fn ensure_system_turn(&mut self, policy: &str) {
        if self.messages.is_empty() {
            self.add_message(Message::system(policy));
        }
    }

    /// Clear all messages in the session
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if session is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new("session-123");
        assert_eq!(session.id, "session-123");
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_add_message() {
        let mut session = Session::new("session-123");
        session.add_message(Message::user("Hello"));
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn test_system_turn_injected_once() {
        let mut session = Session::new("session-123");

        session.ensure_system_turn("policy");
        session.add_message(Message::user("first message"));

        // Second request on the same session must not inject another policy
        session.ensure_system_turn("policy");
        session.add_message(Message::user("second message"));

        let system_turns = session
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .count();
        assert_eq!(system_turns, 1);
        assert_eq!(session.messages[0].role, "system");
        assert_eq!(session.messages.len(), 3);
    }
}

//! Chat message domain types.
//!
//! The generator consumes an ordered, chronological list of messages.
//! Small function-calling models work best with the system instruction
//! folded into the first user turn, so there is no separate system role.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a generator conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (also carries the folded-in system instruction)
    User,
    /// The model
    Assistant,
}

/// A single message in a generator conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = ChatMessage::user("Check the prod cluster");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Check the prod cluster");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ChatMessage::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }
}

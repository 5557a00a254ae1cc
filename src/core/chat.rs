use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::RecordId;

/// Every user's conversation, keyed by user id, oldest message first.
pub type ChatLog = BTreeMap<RecordId, Vec<ChatMessage>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Speaker::User, message)
    }

    pub fn ai(message: impl Into<String>) -> Self {
        Self::new(Speaker::Ai, message)
    }

    fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_is_stored_under_type() {
        let json = serde_json::to_value(ChatMessage::ai("hello")).unwrap();
        assert_eq!(json["type"], "ai");
        assert_eq!(json["message"], "hello");
    }
}

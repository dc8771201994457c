//! Chat, message, and summary types shared by the prompt layer.
//!
//! A `Chat` identifies one conversation on one messaging platform. Its string
//! form `namespace|id` is used as a lookup suffix by per-user prompt keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Timestamp layout used wherever a message time is shown to the model.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ (%a)";

/// Format a timestamp the way prompts present it, e.g. `2024-05-01 10:00:00Z (Wed)`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// A conversation on a messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chat {
    /// Platform namespace, e.g. `telegram`.
    pub namespace: String,
    /// Identifier of the user within the namespace.
    pub id: String,
}

impl Chat {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Chat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.namespace, self.id)
    }
}

impl FromStr for Chat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').collect();
        match parts.as_slice() {
            [namespace, id] => Ok(Chat::new(*namespace, *id)),
            _ => Err(format!("invalid chat string: '{s}'")),
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "User"),
            Author::Bot => write!(f, "Bot"),
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: DateTime<Utc>,
    pub author: Author,
    pub content: String,
}

impl Message {
    pub fn new(timestamp: DateTime<Utc>, author: Author, content: impl Into<String>) -> Self {
        Self {
            timestamp,
            author,
            content: content.into(),
        }
    }
}

/// A stored summary produced by conversation processing.
///
/// `summary_id` names the kind of summary: `Summary` for general
/// conversation summaries, `UserProfile{Property}` for learned profile facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub chat: Chat,
    pub summary_id: String,
    pub time: DateTime<Utc>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chat_display_and_parse_roundtrip() {
        let chat = Chat::new("telegram", "12345");
        assert_eq!(chat.to_string(), "telegram|12345");
        let parsed: Chat = "telegram|12345".parse().unwrap();
        assert_eq!(parsed, chat);
    }

    #[test]
    fn test_chat_parse_rejects_wrong_arity() {
        assert!("telegram".parse::<Chat>().is_err());
        assert!("a|b|c".parse::<Chat>().is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-05-01 10:00:00Z (Wed)");
    }

    #[test]
    fn test_author_serde() {
        let json = serde_json::to_string(&Author::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
        assert_eq!(Author::User.to_string(), "User");
    }
}

//! Built-in template sources.
//!
//! Each source answers for a fixed set of keys. Turn-scoped sources read the
//! shared [`UserMessageContext`](crate::chat::context::UserMessageContext);
//! storage-backed ones delegate to the repository ports.

pub mod authorization;
pub mod dictionary;
pub mod learned_profile;
pub mod llm_info;
pub mod prior_conversations;
pub mod recent_messages;
pub mod user_specific;
pub mod version;

use parley_types::error::SourceError;

/// Reject a key this single-key source does not serve.
pub(crate) fn expect_key(expected: &str, key: &str) -> Result<(), SourceError> {
    if key == expected {
        Ok(())
    } else {
        Err(SourceError::UnsupportedKey(key.to_string()))
    }
}

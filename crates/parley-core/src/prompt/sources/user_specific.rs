//! Per-chat user introduction from inline configuration.

use std::collections::HashMap;
use std::sync::Arc;

use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::context::UserMessageContext;
use crate::prompt::source::TemplateSource;

pub const USER_BASIC_INTRODUCTION_KEY: &str = "user-basic-introduction";

/// Served when the chat has no dedicated introduction.
pub const UNKNOWN_USER_FALLBACK: &str = "◄unknown-user-prompt►";

/// Serves `user-basic-introduction` from the inline entry
/// `user-basic-introduction-{chat}`, or a reference to `unknown-user-prompt`
/// when the chat has none.
pub struct UserSpecificTemplateSource {
    inline: Arc<HashMap<String, String>>,
    context: Arc<UserMessageContext>,
}

impl UserSpecificTemplateSource {
    pub fn new(inline: Arc<HashMap<String, String>>, context: Arc<UserMessageContext>) -> Self {
        Self { inline, context }
    }
}

impl TemplateSource for UserSpecificTemplateSource {
    fn name(&self) -> &str {
        "user-specific"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == USER_BASIC_INTRODUCTION_KEY)
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(USER_BASIC_INTRODUCTION_KEY, key)?;

        let Some(chat) = &self.context.chat else {
            tracing::warn!("Chat is not set in the context; using stranger prompt");
            return Ok(UNKNOWN_USER_FALLBACK.to_string());
        };

        let lookup = format!("{USER_BASIC_INTRODUCTION_KEY}-{chat}");
        match self.inline.get(&lookup) {
            Some(introduction) => {
                tracing::info!(chat = %chat, "Found user-specific prompt");
                Ok(introduction.clone())
            }
            None => {
                tracing::info!(chat = %chat, "No user-specific prompt; using stranger prompt");
                Ok(UNKNOWN_USER_FALLBACK.to_string())
            }
        }
    }
}

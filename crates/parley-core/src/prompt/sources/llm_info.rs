//! Name of the model answering the current turn.

use std::sync::Arc;

use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::context::UserMessageContext;
use crate::prompt::source::TemplateSource;

pub const CHAT_LLM_KEY: &str = "chat-llm";

pub struct LlmInfoTemplateSource {
    context: Arc<UserMessageContext>,
}

impl LlmInfoTemplateSource {
    pub fn new(context: Arc<UserMessageContext>) -> Self {
        Self { context }
    }
}

impl TemplateSource for LlmInfoTemplateSource {
    fn name(&self) -> &str {
        "llm-info"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == CHAT_LLM_KEY)
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(CHAT_LLM_KEY, key)?;
        self.context
            .active_model
            .map(|model| model.display_name().to_string())
            .ok_or_else(|| SourceError::Unavailable("no active model for this turn".to_string()))
    }
}

//! Per-turn state shared by the turn-scoped template sources.

use parley_types::chat::{Chat, Message};
use parley_types::llm::TextCompletionModel;

/// What the bot knows about the turn being answered.
///
/// Built once per incoming message and shared through an `Arc` by every
/// source that needs it. Every field is optional: a compile outside a chat
/// turn (e.g. from the CLI) may know none of them.
#[derive(Debug, Clone, Default)]
pub struct UserMessageContext {
    pub message: Option<Message>,
    pub chat: Option<Chat>,
    pub active_model: Option<TextCompletionModel>,
}

impl UserMessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_chat(mut self, chat: Chat) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_active_model(mut self, model: TextCompletionModel) -> Self {
        self.active_model = Some(model);
        self
    }
}

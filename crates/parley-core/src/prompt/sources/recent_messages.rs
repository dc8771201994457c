//! The ongoing conversation rendered in the active model's chat markup.

use std::sync::Arc;

use chrono::Utc;
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::context::UserMessageContext;
use crate::chat::conversation::CurrentConversation;
use crate::chat::formatter::formatter_for;
use crate::prompt::source::TemplateSource;

pub const RECENT_MESSAGES_KEY: &str = "llm-formatted-recent-messages-with-reply-primer";

/// Formats the earlier messages plus the one being answered, followed by a
/// reply primer. Empty when the turn has no chat or no message.
pub struct RecentMessagesTemplateSource<C> {
    conversation: Arc<C>,
    context: Arc<UserMessageContext>,
}

impl<C: CurrentConversation> RecentMessagesTemplateSource<C> {
    pub fn new(conversation: Arc<C>, context: Arc<UserMessageContext>) -> Self {
        Self {
            conversation,
            context,
        }
    }
}

impl<C: CurrentConversation> TemplateSource for RecentMessagesTemplateSource<C> {
    fn name(&self) -> &str {
        "recent-messages"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == RECENT_MESSAGES_KEY)
    }

    async fn get_value(&self, key: &str, cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(RECENT_MESSAGES_KEY, key)?;

        if self.context.chat.is_none() {
            tracing::warn!("Chat is not set in the context");
            return Ok(String::new());
        }
        let Some(current) = &self.context.message else {
            tracing::warn!("Message is not set in the context");
            return Ok(String::new());
        };
        let model = self
            .context
            .active_model
            .ok_or_else(|| SourceError::Unavailable("no active model for this turn".to_string()))?;

        let mut messages = self.conversation.get_messages(cancel).await?;
        messages.push(current.clone());

        let formatter = formatter_for(model, Utc::now());
        Ok(formatter.format_conversation(&messages, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parley_types::chat::{Author, Chat, Message};
    use parley_types::error::RepositoryError;
    use parley_types::llm::TextCompletionModel;

    struct FixedConversation(Vec<Message>);

    impl CurrentConversation for FixedConversation {
        async fn get_messages(&self, _cancel: &CancellationToken) -> Result<Vec<Message>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    fn message(minute: u32, author: Author, content: &str) -> Message {
        Message::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
            author,
            content,
        )
    }

    fn source(context: UserMessageContext) -> RecentMessagesTemplateSource<FixedConversation> {
        let earlier = vec![
            message(0, Author::User, "Hi"),
            message(1, Author::Bot, "Hello!"),
        ];
        RecentMessagesTemplateSource::new(Arc::new(FixedConversation(earlier)), Arc::new(context))
    }

    #[tokio::test]
    async fn test_formats_conversation_with_current_message_and_primer() {
        let context = UserMessageContext::new()
            .with_chat(Chat::new("telegram", "42"))
            .with_message(message(2, Author::User, "How are you?"))
            .with_active_model(TextCompletionModel::Qwen2_72BInstruct);

        let value = source(context)
            .get_value(RECENT_MESSAGES_KEY, &CancellationToken::new())
            .await
            .unwrap();

        assert!(value.starts_with("<|im_start|>user at 2024-05-01 10:00:00Z (Wed)\nHi<|im_end|>\n"));
        assert!(value.contains(
            "<|im_start|>user at 2024-05-01 10:02:00Z (Wed)\nHow are you?<|im_end|>\n<|im_start|>assistant at "
        ));
        assert!(value.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_empty_without_chat_or_message() {
        let cancel = CancellationToken::new();
        let no_chat = UserMessageContext::new().with_message(message(2, Author::User, "Hey"));
        let no_message = UserMessageContext::new().with_chat(Chat::new("telegram", "42"));

        assert_eq!(source(no_chat).get_value(RECENT_MESSAGES_KEY, &cancel).await.unwrap(), "");
        assert_eq!(source(no_message).get_value(RECENT_MESSAGES_KEY, &cancel).await.unwrap(), "");
    }
}

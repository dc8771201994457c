//! Summaries of earlier conversations relevant to the current one.
//!
//! The current conversation is flattened to `{author} at {time}: {text}`
//! lines, embedded, and used to look up similar stored summaries. The
//! matches are joined with `---` separator lines.

use std::sync::Arc;

use parley_types::chat::format_timestamp;
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::context::UserMessageContext;
use crate::chat::conversation::CurrentConversation;
use crate::prompt::source::TemplateSource;
use crate::repository::embedding::{EmbeddingLookup, TextEmbedder};

pub const PRIOR_CONVERSATIONS_KEY: &str = "prior-conversations";

/// Summary kind searched for relevant prior conversations.
const CONVERSATION_SUMMARY_ID: &str = "Summary";

pub struct PriorConversationsTemplateSource<C, E, L> {
    conversation: Arc<C>,
    embedder: Arc<E>,
    lookup: Arc<L>,
    context: Arc<UserMessageContext>,
}

impl<C, E, L> PriorConversationsTemplateSource<C, E, L>
where
    C: CurrentConversation,
    E: TextEmbedder,
    L: EmbeddingLookup,
{
    pub fn new(
        conversation: Arc<C>,
        embedder: Arc<E>,
        lookup: Arc<L>,
        context: Arc<UserMessageContext>,
    ) -> Self {
        Self {
            conversation,
            embedder,
            lookup,
            context,
        }
    }
}

impl<C, E, L> TemplateSource for PriorConversationsTemplateSource<C, E, L>
where
    C: CurrentConversation,
    E: TextEmbedder,
    L: EmbeddingLookup,
{
    fn name(&self) -> &str {
        "prior-conversations"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == PRIOR_CONVERSATIONS_KEY)
    }

    async fn get_value(&self, key: &str, cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(PRIOR_CONVERSATIONS_KEY, key)?;

        let Some(chat) = &self.context.chat else {
            tracing::warn!("Chat is not set in the context");
            return Ok(String::new());
        };
        let Some(current) = &self.context.message else {
            tracing::warn!("Message is not set in the context");
            return Ok(String::new());
        };

        let mut messages = self.conversation.get_messages(cancel).await?;
        messages.push(current.clone());
        let transcript: String = messages
            .iter()
            .map(|m| format!("{} at {}: {}\n", m.author, format_timestamp(&m.timestamp), m.content))
            .collect();

        let Some(embedding) = self.embedder.embed(&transcript, cancel).await? else {
            tracing::warn!(chat = %chat, "Failed to generate embedding for current conversation");
            return Ok(String::new());
        };

        let summaries = self
            .lookup
            .relevant_summaries(CONVERSATION_SUMMARY_ID, chat, &embedding, cancel)
            .await?;
        tracing::debug!(chat = %chat, count = summaries.len(), "Relevant prior conversations found");

        Ok(summaries
            .iter()
            .map(|s| format!("{}\n", s.content))
            .collect::<Vec<_>>()
            .join("---\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use chrono::{TimeZone, Utc};
    use parley_types::chat::{Author, Chat, Message, Summary};
    use parley_types::error::RepositoryError;

    struct FixedConversation(Vec<Message>);

    impl CurrentConversation for FixedConversation {
        async fn get_messages(&self, _cancel: &CancellationToken) -> Result<Vec<Message>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    /// Records the embedded text; returns `None` for empty input.
    #[derive(Default)]
    struct RecordingEmbedder {
        seen: Mutex<Vec<String>>,
    }

    impl TextEmbedder for RecordingEmbedder {
        async fn embed(&self, text: &str, _cancel: &CancellationToken) -> Result<Option<Vec<f32>>, RepositoryError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok((!text.is_empty()).then(|| vec![0.5, 0.25]))
        }
    }

    struct FixedLookup(Vec<&'static str>);

    impl EmbeddingLookup for FixedLookup {
        async fn relevant_summaries(
            &self,
            summary_id: &str,
            chat: &Chat,
            embedding: &[f32],
            _cancel: &CancellationToken,
        ) -> Result<Vec<Summary>, RepositoryError> {
            assert_eq!(summary_id, "Summary");
            assert_eq!(embedding, &[0.5, 0.25]);
            Ok(self
                .0
                .iter()
                .map(|content| Summary {
                    chat: chat.clone(),
                    summary_id: summary_id.to_string(),
                    time: Utc::now(),
                    content: content.to_string(),
                })
                .collect())
        }
    }

    fn at(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_joins_relevant_summaries() {
        let embedder = Arc::new(RecordingEmbedder::default());
        let context = UserMessageContext::new()
            .with_chat(Chat::new("telegram", "42"))
            .with_message(Message::new(at(1), Author::User, "Remember my cat?"));
        let source = PriorConversationsTemplateSource::new(
            Arc::new(FixedConversation(vec![Message::new(at(0), Author::Bot, "Hi Ann")])),
            embedder.clone(),
            Arc::new(FixedLookup(vec!["Talked about cats.", "Planned a trip."])),
            Arc::new(context),
        );

        let value = source
            .get_value(PRIOR_CONVERSATIONS_KEY, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(value, "Talked about cats.\n---\nPlanned a trip.\n");
        assert_eq!(
            embedder.seen.lock().unwrap().as_slice(),
            ["Bot at 2024-05-01 10:00:00Z (Wed): Hi Ann\nUser at 2024-05-01 10:01:00Z (Wed): Remember my cat?\n"]
        );
    }

    #[tokio::test]
    async fn test_empty_without_chat() {
        let source = PriorConversationsTemplateSource::new(
            Arc::new(FixedConversation(Vec::new())),
            Arc::new(RecordingEmbedder::default()),
            Arc::new(FixedLookup(vec!["unused"])),
            Arc::new(UserMessageContext::new()),
        );
        let value = source
            .get_value(PRIOR_CONVERSATIONS_KEY, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "");
    }
}

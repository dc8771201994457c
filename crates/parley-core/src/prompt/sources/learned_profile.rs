//! Facts learned about the user, one line per profile property.

use std::sync::Arc;

use futures_util::future::try_join_all;
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::context::UserMessageContext;
use crate::prompt::source::TemplateSource;
use crate::repository::summary::SummaryStorage;

pub const LEARNED_USER_PROFILE_KEY: &str = "learned-user-profile";

/// Summary kind prefix for learned profile properties.
const USER_PROFILE_SUMMARY_PREFIX: &str = "UserProfile";

pub struct LearnedUserProfileTemplateSource<S> {
    storage: Arc<S>,
    properties: Vec<String>,
    context: Arc<UserMessageContext>,
}

impl<S: SummaryStorage> LearnedUserProfileTemplateSource<S> {
    /// `properties` are the configured profile property names, in output order.
    pub fn new(storage: Arc<S>, properties: Vec<String>, context: Arc<UserMessageContext>) -> Self {
        Self {
            storage,
            properties,
            context,
        }
    }
}

impl<S: SummaryStorage> TemplateSource for LearnedUserProfileTemplateSource<S> {
    fn name(&self) -> &str {
        "learned-user-profile"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == LEARNED_USER_PROFILE_KEY)
    }

    async fn get_value(&self, key: &str, cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(LEARNED_USER_PROFILE_KEY, key)?;

        if self.properties.is_empty() {
            return Ok(String::new());
        }
        let Some(chat) = &self.context.chat else {
            tracing::warn!("Chat is not set in the context");
            return Ok(String::new());
        };

        let lookups = self.properties.iter().map(|property| {
            let summary_id = format!("{USER_PROFILE_SUMMARY_PREFIX}{property}");
            async move { self.storage.get_latest_summary(chat, &summary_id, cancel).await }
        });
        let latest = try_join_all(lookups).await?;

        let mut out = String::new();
        for (property, summary) in self.properties.iter().zip(&latest) {
            match summary {
                Some(s) if !s.content.trim().is_empty() => {
                    out.push_str(&format!("- {property}: {}\n", s.content));
                }
                _ => {}
            }
        }
        if out.is_empty() {
            return Ok(out);
        }
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use chrono::Utc;
    use parley_types::chat::{Chat, Summary};
    use parley_types::error::RepositoryError;

    struct MapStorage(HashMap<String, String>);

    impl SummaryStorage for MapStorage {
        async fn get_latest_summary(
            &self,
            chat: &Chat,
            summary_id: &str,
            _cancel: &CancellationToken,
        ) -> Result<Option<Summary>, RepositoryError> {
            Ok(self.0.get(summary_id).map(|content| Summary {
                chat: chat.clone(),
                summary_id: summary_id.to_string(),
                time: Utc::now(),
                content: content.clone(),
            }))
        }
    }

    fn source(
        stored: &[(&str, &str)],
        context: UserMessageContext,
    ) -> LearnedUserProfileTemplateSource<MapStorage> {
        let storage = MapStorage(
            stored
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        LearnedUserProfileTemplateSource::new(
            Arc::new(storage),
            vec!["Name".to_string(), "Hobbies".to_string(), "Pets".to_string()],
            Arc::new(context),
        )
    }

    fn in_chat() -> UserMessageContext {
        UserMessageContext::new().with_chat(Chat::new("telegram", "42"))
    }

    #[tokio::test]
    async fn test_lists_non_blank_properties() {
        let source = source(
            &[("UserProfileName", "Ann"), ("UserProfileHobbies", "  "), ("UserProfilePets", "a cat")],
            in_chat(),
        );
        let value = source
            .get_value(LEARNED_USER_PROFILE_KEY, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "- Name: Ann\n- Pets: a cat\n\n");
    }

    #[tokio::test]
    async fn test_empty_when_nothing_learned_or_no_chat() {
        let cancel = CancellationToken::new();
        let nothing = source(&[], in_chat());
        assert_eq!(nothing.get_value(LEARNED_USER_PROFILE_KEY, &cancel).await.unwrap(), "");

        let no_chat = source(&[("UserProfileName", "Ann")], UserMessageContext::new());
        assert_eq!(no_chat.get_value(LEARNED_USER_PROFILE_KEY, &cancel).await.unwrap(), "");
    }
}

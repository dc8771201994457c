//! Guard text chosen by whether the current chat is authorized.

use std::sync::Arc;

use parley_types::config::AuthorizationSettings;
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use super::expect_key;
use crate::chat::authorization::ChatAuthorization;
use crate::chat::context::UserMessageContext;
use crate::prompt::source::TemplateSource;

pub const CHAT_AUTHORIZATION_GUARD_KEY: &str = "chat-authorization-guard";

/// Serves the authorized or unauthorized template for the turn's chat.
/// A turn without a chat is treated as unauthorized.
pub struct ChatAuthorizationTemplateSource<A> {
    authorization: Arc<A>,
    settings: AuthorizationSettings,
    context: Arc<UserMessageContext>,
}

impl<A: ChatAuthorization> ChatAuthorizationTemplateSource<A> {
    pub fn new(
        authorization: Arc<A>,
        settings: AuthorizationSettings,
        context: Arc<UserMessageContext>,
    ) -> Self {
        Self {
            authorization,
            settings,
            context,
        }
    }
}

impl<A: ChatAuthorization> TemplateSource for ChatAuthorizationTemplateSource<A> {
    fn name(&self) -> &str {
        "chat-authorization"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(key == CHAT_AUTHORIZATION_GUARD_KEY)
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        expect_key(CHAT_AUTHORIZATION_GUARD_KEY, key)?;

        let authorized = match &self.context.chat {
            Some(chat) => self.authorization.is_authorized(chat).await,
            None => {
                tracing::warn!("Chat is not set in the context; treating as unauthorized");
                false
            }
        };

        Ok(if authorized {
            self.settings.authorized_template.clone()
        } else {
            self.settings.unauthorized_template.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::authorization::PromptDefinedAuthorization;
    use parley_types::chat::Chat;

    fn source(context: UserMessageContext) -> ChatAuthorizationTemplateSource<PromptDefinedAuthorization> {
        let keys = ["user-basic-introduction-telegram|42".to_string()];
        ChatAuthorizationTemplateSource::new(
            Arc::new(PromptDefinedAuthorization::new(keys.iter(), "user-basic-introduction-")),
            AuthorizationSettings {
                authorized_template: "Welcome back.".to_string(),
                unauthorized_template: "Politely decline.".to_string(),
            },
            Arc::new(context),
        )
    }

    async fn guard(context: UserMessageContext) -> String {
        source(context)
            .get_value(CHAT_AUTHORIZATION_GUARD_KEY, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_guard_follows_authorization() {
        let known = UserMessageContext::new().with_chat(Chat::new("telegram", "42"));
        let stranger = UserMessageContext::new().with_chat(Chat::new("telegram", "1"));

        assert_eq!(guard(known).await, "Welcome back.");
        assert_eq!(guard(stranger).await, "Politely decline.");
        assert_eq!(guard(UserMessageContext::new()).await, "Politely decline.");
    }
}

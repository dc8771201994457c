//! Chat authorization checks.

use std::collections::HashSet;

use parley_types::chat::Chat;

/// Decides whether a chat may talk to the bot.
pub trait ChatAuthorization: Send + Sync {
    fn is_authorized(&self, chat: &Chat) -> impl std::future::Future<Output = bool> + Send;
}

/// Authorizes the chats that have a dedicated inline prompt.
///
/// A chat is authorized when the inline prompt table holds the key
/// `{prefix}{chat}`, e.g. `user-basic-introduction-telegram|42`.
#[derive(Debug, Clone)]
pub struct PromptDefinedAuthorization {
    authorized: HashSet<Chat>,
}

impl PromptDefinedAuthorization {
    pub fn new<'a>(inline_keys: impl IntoIterator<Item = &'a String>, prefix: &str) -> Self {
        let authorized = inline_keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(prefix))
            .filter_map(|suffix| match suffix.parse::<Chat>() {
                Ok(chat) => Some(chat),
                Err(e) => {
                    tracing::warn!(key = %suffix, error = %e, "Ignoring malformed chat in prompt key");
                    None
                }
            })
            .collect();
        Self { authorized }
    }

    pub fn authorized_chats(&self) -> usize {
        self.authorized.len()
    }
}

impl ChatAuthorization for PromptDefinedAuthorization {
    async fn is_authorized(&self, chat: &Chat) -> bool {
        let authorized = self.authorized.contains(chat);
        tracing::info!(chat = %chat, authorized, "Chat authorization checked");
        authorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_defined_authorization() {
        let keys = [
            "user-basic-introduction-telegram|42".to_string(),
            "user-basic-introduction-broken".to_string(),
            "unknown-user-prompt".to_string(),
        ];
        let auth = PromptDefinedAuthorization::new(keys.iter(), "user-basic-introduction-");

        assert_eq!(auth.authorized_chats(), 1);
        assert!(auth.is_authorized(&Chat::new("telegram", "42")).await);
        assert!(!auth.is_authorized(&Chat::new("telegram", "43")).await);
    }
}

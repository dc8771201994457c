//! Access to the conversation currently in progress.

use parley_types::chat::Message;
use parley_types::error::RepositoryError;
use tokio_util::sync::CancellationToken;

/// Messages of the ongoing conversation in the active chat.
///
/// Implementations exclude the message being answered; the caller appends it.
pub trait CurrentConversation: Send + Sync {
    /// Earlier messages of the conversation, oldest first.
    fn get_messages(
        &self,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;
}

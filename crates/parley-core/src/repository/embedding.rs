//! Embedding generation and similarity lookup traits.

use parley_types::chat::{Chat, Summary};
use parley_types::error::RepositoryError;
use tokio_util::sync::CancellationToken;

/// Turns text into an embedding vector.
pub trait TextEmbedder: Send + Sync {
    /// Returns `None` when the backend produced no embedding.
    fn embed(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<Option<Vec<f32>>, RepositoryError>> + Send;
}

/// Finds stored summaries similar to a query embedding.
pub trait EmbeddingLookup: Send + Sync {
    /// Summaries of kind `summary_id` in `chat`, most relevant first.
    fn relevant_summaries(
        &self,
        summary_id: &str,
        chat: &Chat,
        embedding: &[f32],
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<Vec<Summary>, RepositoryError>> + Send;
}

//! Summary storage trait definition.

use parley_types::chat::{Chat, Summary};
use parley_types::error::RepositoryError;
use tokio_util::sync::CancellationToken;

/// Read access to summaries produced by conversation processing.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait SummaryStorage: Send + Sync {
    /// Most recent summary of kind `summary_id` for `chat`, if any.
    fn get_latest_summary(
        &self,
        chat: &Chat,
        summary_id: &str,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<Option<Summary>, RepositoryError>> + Send;
}

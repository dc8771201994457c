//! TemplateSource trait definition and its object-safe wrapper.
//!
//! A source answers two questions about a key: "do you have it" and "give me
//! its raw markup". Files, inline config, per-turn chat state, and computed
//! values all implement the same trait; the compiler holds a heterogeneous,
//! ordered list of them.
//!
//! Two layers:
//! 1. `TemplateSource` uses RPITIT (native async fn in traits)
//! 2. Object-safe `TemplateSourceDyn` with boxed futures, blanket-implemented
//!    for all `T: TemplateSource`

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

/// Trait for providers of raw template text.
pub trait TemplateSource: Send + Sync {
    /// Short name used in logs and error messages (e.g., "file", "inline").
    fn name(&self) -> &str;

    /// Whether this source can produce a value for `key`.
    fn has_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<bool, SourceError>> + Send;

    /// Raw markup for `key`.
    ///
    /// Only called after `has_key` returned true for the same key during the
    /// same discovery step. Long-running sources should observe `cancel`.
    fn get_value(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// Object-safe version of [`TemplateSource`] with boxed futures.
pub trait TemplateSourceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn has_key_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SourceError>> + Send + 'a>>;

    fn get_value_boxed<'a>(
        &'a self,
        key: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>>;
}

impl<T: TemplateSource> TemplateSourceDyn for T {
    fn name(&self) -> &str {
        TemplateSource::name(self)
    }

    fn has_key_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SourceError>> + Send + 'a>> {
        Box::pin(self.has_key(key))
    }

    fn get_value_boxed<'a>(
        &'a self,
        key: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>> {
        Box::pin(self.get_value(key, cancel))
    }
}

/// Shared, type-erased template source.
pub type DynTemplateSource = Arc<dyn TemplateSourceDyn>;

/// Wrap a concrete source for registration with the compiler.
pub fn dyn_source<T: TemplateSource + 'static>(source: T) -> DynTemplateSource {
    Arc::new(source)
}

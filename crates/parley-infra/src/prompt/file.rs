//! Templates stored as `{key}.md` files in a directory.

use std::path::PathBuf;

use parley_core::prompt::source::TemplateSource;
use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

/// File extension of template files.
const TEMPLATE_EXTENSION: &str = "md";

/// Serves `{dir}/{key}.md`.
///
/// Keys that could escape the directory (path separators, `..`) are never
/// served.
#[derive(Debug, Clone)]
pub struct FileTemplateSource {
    dir: PathBuf,
}

impl FileTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn template_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{key}.{TEMPLATE_EXTENSION}")))
    }
}

impl TemplateSource for FileTemplateSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        let Some(path) = self.template_path(key) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        let path = self
            .template_path(key)
            .ok_or_else(|| SourceError::UnsupportedKey(key.to_string()))?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "Template file read");
                Ok(content)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

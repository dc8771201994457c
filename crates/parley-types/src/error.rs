use thiserror::Error;

/// Errors raised while parsing or rendering a single template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unmatched placeholder start marker at byte {position}")]
    UnmatchedStartMarker { position: usize },

    #[error("the following placeholders are not defined: {}", names.join(", "))]
    MissingValues { names: Vec<String> },
}

/// Errors returned by a template source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("key '{0}' is not supported by this source")]
    UnsupportedKey(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// Errors from a prompt compilation call.
///
/// Every variant is fatal to the call that produced it. The compiler never
/// retries and never returns partially rendered text.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template '{key}' is malformed: unmatched placeholder start marker at byte {position}")]
    MalformedTemplate { key: String, position: usize },

    /// Discovery resolved the graph but a render step still lacked a value.
    /// This is an internal defect, not a user-facing condition.
    #[error("template '{key}' rendered without values for: {}", missing.join(", "))]
    MissingPlaceholderValue { key: String, missing: Vec<String> },

    #[error("no zero-dependency templates found for '{key}'; check for circular dependency{}", detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    CircularOrUnsatisfiableDependency { key: String, detail: Option<String> },

    #[error("template '{key}' could not be resolved (pending: [{}], missing: [{}])", pending.join(", "), missing.join(", "))]
    UnresolvedTemplate {
        key: String,
        pending: Vec<String>,
        missing: Vec<String>,
    },

    #[error("source '{source_name}' failed for key '{key}': {message}")]
    Source {
        key: String,
        source_name: String,
        message: String,
    },

    #[error("compilation of '{key}' was cancelled")]
    Cancelled { key: String },
}

impl PromptError {
    /// Whether this error signals a bug in the compiler rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, PromptError::MissingPlaceholderValue { .. })
    }
}

/// Errors from storage collaborators (chat history, summaries, embeddings).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

impl From<RepositoryError> for SourceError {
    fn from(err: RepositoryError) -> Self {
        SourceError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_display() {
        let err = TemplateError::MissingValues {
            names: vec!["bot_name".to_string(), "name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "the following placeholders are not defined: bot_name, name"
        );
    }

    #[test]
    fn test_circular_display_with_cycle() {
        let err = PromptError::CircularOrUnsatisfiableDependency {
            key: "root".to_string(),
            detail: Some("cycle involving 'root'".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("'root'"));
        assert!(msg.contains("circular dependency (cycle involving 'root')"));
    }

    #[test]
    fn test_unresolved_display_lists_keys() {
        let err = PromptError::UnresolvedTemplate {
            key: "root".to_string(),
            pending: vec!["b".to_string(), "c".to_string()],
            missing: vec!["ghost".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "template 'root' could not be resolved (pending: [b, c], missing: [ghost])"
        );
    }

    #[test]
    fn test_only_missing_placeholder_is_defect() {
        let defect = PromptError::MissingPlaceholderValue {
            key: "a".to_string(),
            missing: vec!["b".to_string()],
        };
        assert!(defect.is_defect());
        assert!(!PromptError::Cancelled { key: "a".to_string() }.is_defect());
    }

    #[test]
    fn test_repository_error_into_source_error() {
        let err: SourceError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: syntax error");
    }
}

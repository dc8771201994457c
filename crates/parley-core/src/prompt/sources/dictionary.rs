//! In-memory template source backed by a map.
//!
//! Serves inline prompts from configuration and the per-call override values
//! passed to `compile_prompt`. Keys are matched exactly.

use std::collections::HashMap;

use parley_types::error::SourceError;
use tokio_util::sync::CancellationToken;

use crate::prompt::source::TemplateSource;

pub struct DictionaryTemplateSource {
    name: String,
    templates: HashMap<String, String>,
}

impl DictionaryTemplateSource {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self::named("dictionary", templates)
    }

    /// Create a dictionary source with a custom diagnostic name.
    pub fn named(name: impl Into<String>, templates: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            templates,
        }
    }
}

impl TemplateSource for DictionaryTemplateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_key(&self, key: &str) -> Result<bool, SourceError> {
        Ok(self.templates.contains_key(key))
    }

    async fn get_value(&self, key: &str, _cancel: &CancellationToken) -> Result<String, SourceError> {
        self.templates
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(key.to_string()))
    }
}

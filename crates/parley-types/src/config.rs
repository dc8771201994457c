//! Settings types for Parley.
//!
//! `Settings` represents the top-level `config.toml` that wires the prompt
//! sources: where default templates live, inline prompt overrides, chat
//! authorization templates, and the active models.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::TextCompletionModel;
use crate::prompt::SourcePrecedence;

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub prompts: PromptsSettings,

    #[serde(default)]
    pub models: ModelsSettings,

    #[serde(default)]
    pub conversation_processing: ConversationProcessingSettings,
}

/// Where prompt templates come from and how colliding keys are resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsSettings {
    /// Directory holding `{key}.md` default templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    #[serde(default)]
    pub precedence: SourcePrecedence,

    /// Inline prompt templates keyed by template key.
    #[serde(default)]
    pub inline: HashMap<String, String>,

    /// Inline keys starting with this prefix mark authorized chats
    /// (`{prefix}{namespace}|{id}`).
    #[serde(default = "default_authorized_chat_prefix")]
    pub authorized_chat_prefix: String,

    #[serde(default)]
    pub authorization: Option<AuthorizationSettings>,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("Data").join("DefaultPrompts")
}

fn default_authorized_chat_prefix() -> String {
    "user-basic-introduction-".to_string()
}

impl Default for PromptsSettings {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            precedence: SourcePrecedence::default(),
            inline: HashMap::new(),
            authorized_chat_prefix: default_authorized_chat_prefix(),
            authorization: None,
        }
    }
}

/// Templates served for `chat-authorization-guard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationSettings {
    #[serde(default)]
    pub authorized_template: String,
    #[serde(default)]
    pub unauthorized_template: String,
}

/// Models used per purpose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsSettings {
    #[serde(default)]
    pub chat_turn: Option<TextCompletionModel>,
    #[serde(default)]
    pub conv_summary: Option<TextCompletionModel>,
    #[serde(default)]
    pub user_profile_updater: Option<TextCompletionModel>,
}

/// Conversation post-processing settings consumed by the prompt layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationProcessingSettings {
    /// Learned user-profile properties, name -> extraction instruction.
    #[serde(default)]
    pub user_profile_properties: BTreeMap<String, String>,

    /// Whether prior conversation summaries are retrieved by embedding similarity.
    #[serde(default)]
    pub enable_summary_rag: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::default();
        assert_eq!(
            settings.prompts.templates_dir,
            PathBuf::from("Data").join("DefaultPrompts")
        );
        assert_eq!(settings.prompts.precedence, SourcePrecedence::LastRegisteredWins);
        assert!(settings.prompts.inline.is_empty());
        assert!(settings.models.chat_turn.is_none());
    }

    #[test]
    fn test_settings_deserialize_empty() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.prompts.authorized_chat_prefix, "user-basic-introduction-");
        assert!(settings.conversation_processing.user_profile_properties.is_empty());
    }

    #[test]
    fn test_settings_deserialize_with_values() {
        let toml_str = r#"
[prompts]
templates_dir = "prompts"
precedence = "first-registered-wins"

[prompts.inline]
"bot-name" = "Parley"
"user-basic-introduction-telegram|42" = "This is Ann."

[prompts.authorization]
authorized_template = "You may chat freely."
unauthorized_template = "Politely refuse."

[models]
chat_turn = "qwen2-72b-instruct"

[conversation_processing.user_profile_properties]
Name = "The user's name"
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.prompts.templates_dir, PathBuf::from("prompts"));
        assert_eq!(settings.prompts.precedence, SourcePrecedence::FirstRegisteredWins);
        assert_eq!(settings.prompts.inline.len(), 2);
        assert_eq!(settings.prompts.inline["bot-name"], "Parley");
        let auth = settings.prompts.authorization.unwrap();
        assert_eq!(auth.unauthorized_template, "Politely refuse.");
        assert_eq!(
            settings.models.chat_turn,
            Some(TextCompletionModel::Qwen2_72BInstruct)
        );
        assert_eq!(
            settings.conversation_processing.user_profile_properties["Name"],
            "The user's name"
        );
    }
}

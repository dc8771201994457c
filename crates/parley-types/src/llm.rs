//! Text-generation model identifiers.
//!
//! The prompt layer only needs to know which model family a turn targets:
//! the family decides the conversation markup and the root prompt key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported text completion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextCompletionModel {
    #[serde(rename = "llama3-8b-instruct")]
    Llama3_8BInstruct,
    #[serde(rename = "llama3-70b-instruct")]
    Llama3_70BInstruct,
    #[serde(rename = "qwen2-72b-instruct")]
    Qwen2_72BInstruct,
}

impl TextCompletionModel {
    /// Identifier of the prompt markup family this model understands.
    pub fn prompt_format_identifier(&self) -> &'static str {
        match self {
            TextCompletionModel::Llama3_8BInstruct | TextCompletionModel::Llama3_70BInstruct => {
                "llama3"
            }
            TextCompletionModel::Qwen2_72BInstruct => "qwen2",
        }
    }

    /// Root prompt key for a purpose, e.g. `llama3-chat-turn-root`.
    pub fn prompt_key(&self, purpose: &str) -> String {
        format!("{}-{}", self.prompt_format_identifier(), purpose)
    }

    /// Human-readable model name.
    pub fn display_name(&self) -> &'static str {
        match self {
            TextCompletionModel::Llama3_8BInstruct => "Llama3_8B_instruct",
            TextCompletionModel::Llama3_70BInstruct => "Llama3_70B_instruct",
            TextCompletionModel::Qwen2_72BInstruct => "Qwen2_72B_instruct",
        }
    }
}

impl fmt::Display for TextCompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TextCompletionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "llama3-8b-instruct" => Ok(TextCompletionModel::Llama3_8BInstruct),
            "llama3-70b-instruct" => Ok(TextCompletionModel::Llama3_70BInstruct),
            "qwen2-72b-instruct" => Ok(TextCompletionModel::Qwen2_72BInstruct),
            other => Err(format!("unsupported model: '{other}'")),
        }
    }
}

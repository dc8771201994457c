//! Prompt CLI commands: compile, inspect.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use console::style;
use tokio_util::sync::CancellationToken;

use parley_core::chat::context::UserMessageContext;
use parley_core::prompt::compiler::{CompilePrompt, PromptCompiler};
use parley_infra::prompt::build_compiler;
use parley_types::chat::{Author, Message};

use super::TurnArgs;
use crate::state::AppState;

/// Turn context assembled from command-line flags.
pub fn turn_context(turn: TurnArgs) -> UserMessageContext {
    let mut context = UserMessageContext::new();
    if let Some(chat) = turn.chat {
        context = context.with_chat(chat);
    }
    if let Some(model) = turn.model {
        context = context.with_active_model(model);
    }
    if let Some(text) = turn.message {
        context = context.with_message(Message::new(Utc::now(), Author::User, text));
    }
    context
}

fn compiler_for(state: &AppState, turn: TurnArgs) -> PromptCompiler {
    let mut turn = turn;
    if turn.model.is_none() {
        turn.model = state.settings.models.chat_turn;
    }
    build_compiler(&state.settings, Arc::new(turn_context(turn)), Vec::new())
}

/// Compile `key` and print the rendered prompt.
///
/// # Examples
///
/// ```bash
/// parley compile llama3-chat-turn-root --chat 'telegram|42' --set persona='Be brief.'
/// ```
pub async fn compile(
    state: &AppState,
    key: &str,
    overrides: Vec<(String, String)>,
    turn: TurnArgs,
    cancel: &CancellationToken,
    json: bool,
) -> Result<()> {
    let compiler = compiler_for(state, turn);
    let overrides: HashMap<String, String> = overrides.into_iter().collect();

    let prompt = compiler.compile_prompt(key, Some(&overrides), cancel).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": key,
                "prompt": prompt,
                "length": prompt.len(),
            }))?
        );
    } else {
        print!("{prompt}");
        if !prompt.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

/// Show the registered sources, the one serving `key`, and its placeholders.
pub async fn inspect(
    state: &AppState,
    key: &str,
    turn: TurnArgs,
    cancel: &CancellationToken,
    json: bool,
) -> Result<()> {
    let compiler = compiler_for(state, turn);
    let resolved = compiler.locate(key, cancel).await?;
    let sources = compiler.source_names();

    if json {
        let (source, placeholders): (Option<&str>, Vec<String>) = match &resolved {
            Some(r) => (Some(r.source_name.as_str()), r.template.placeholder_names().into_iter().collect()),
            None => (None, Vec::new()),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": key,
                "found": resolved.is_some(),
                "source": source,
                "placeholders": placeholders,
                "sources": sources,
                "precedence": compiler.precedence().to_string(),
                "config": state.config_path.display().to_string(),
            }))?
        );
        return Ok(());
    }

    println!();
    let Some(resolved) = resolved else {
        println!(
            "  {} No source holds '{}' (checked: {})",
            style("✗").red().bold(),
            style(key).bold(),
            sources.join(", ")
        );
        println!();
        return Ok(());
    };

    println!(
        "  {} '{}' served by {} ({})",
        style("✓").green().bold(),
        style(key).bold(),
        style(&resolved.source_name).cyan(),
        compiler.precedence()
    );
    let names = resolved.template.placeholder_names();
    if names.is_empty() {
        println!("  {} No placeholders", style("i").blue().bold());
    } else {
        println!("  References:");
        for name in names {
            println!("    {} {}", style("•").dim(), name);
        }
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::Chat;
    use parley_types::llm::TextCompletionModel;

    #[test]
    fn test_turn_context_from_flags() {
        let context = turn_context(TurnArgs {
            chat: Some(Chat::new("telegram", "42")),
            model: Some(TextCompletionModel::Qwen2_72BInstruct),
            message: Some("Hi".to_string()),
        });
        assert_eq!(context.chat, Some(Chat::new("telegram", "42")));
        assert_eq!(context.active_model, Some(TextCompletionModel::Qwen2_72BInstruct));
        assert_eq!(context.message.map(|m| m.content), Some("Hi".to_string()));
    }

    #[test]
    fn test_empty_turn_context() {
        let context = turn_context(TurnArgs::default());
        assert!(context.chat.is_none());
        assert!(context.message.is_none());
        assert!(context.active_model.is_none());
    }
}

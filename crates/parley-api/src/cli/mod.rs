//! CLI command definitions and dispatch for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use parley_types::chat::Chat;
use parley_types::llm::TextCompletionModel;

/// Compile layered prompt templates into the text sent to a language model.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Settings file (defaults to $PARLEY_CONFIG or ~/.parley/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory of `{key}.md` templates, overriding the settings file.
    #[arg(long, global = true, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Turn context shared by the prompt commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TurnArgs {
    /// Chat the turn belongs to, as `namespace|id`.
    #[arg(long, value_parser = parse_chat)]
    pub chat: Option<Chat>,

    /// Model answering the turn (e.g. llama3-8b-instruct).
    #[arg(long, value_parser = parse_model)]
    pub model: Option<TextCompletionModel>,

    /// Text of the user message being answered.
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a template key into its fully rendered prompt.
    Compile {
        /// Root template key (e.g. llama3-chat-turn-root).
        key: String,

        /// Override a template for this call only (repeatable).
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, String)>,

        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Show which source serves a key and what it references.
    Inspect {
        /// Template key to look up.
        key: String,

        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse `key=value`. The key is lower-cased to match placeholder names.
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_lowercase(), value.to_string()))
}

fn parse_chat(raw: &str) -> Result<Chat, String> {
    raw.parse()
}

fn parse_model(raw: &str) -> Result<TextCompletionModel, String> {
    raw.parse()
}

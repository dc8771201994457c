//! Shared domain types for Parley.
//!
//! Chats, messages, summaries, model identifiers, settings, and the error
//! enums shared by the prompt engine and its sources.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;

//! I/O-backed template sources and source-chain wiring.

pub mod build_info;
pub mod chain;
pub mod file;

pub use chain::{build_compiler, build_template_sources, conversation_sources, prior_conversations_source};
pub use file::FileTemplateSource;

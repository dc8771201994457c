//! Chat-side collaborators of the prompt layer.
//!
//! The turn context, the conversation and authorization ports, and the
//! model-specific conversation formatters used by the per-turn sources.

pub mod authorization;
pub mod context;
pub mod conversation;
pub mod formatter;

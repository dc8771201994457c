//! Repository trait definitions (ports).
//!
//! Storage-backed collaborators of the prompt layer: stored summaries and
//! embedding similarity lookup. The core crate never depends on any specific
//! storage technology.

pub mod embedding;
pub mod summary;

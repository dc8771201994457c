//! Infrastructure layer for Parley.
//!
//! Contains the I/O-backed pieces of the prompt layer: the file template
//! source, build-info lookup, the settings loader, and the wiring that
//! assembles a configured source chain.

pub mod config;
pub mod prompt;

//! Prompt compilation engine and repository trait definitions for Parley.
//!
//! This crate defines the template engine, the in-process template sources,
//! and the "ports" (collaborator traits) that storage-backed implementations
//! fulfil. It depends only on `parley-types` -- never on `parley-infra` or
//! any database/IO crate.

pub mod chat;
pub mod prompt;
pub mod repository;

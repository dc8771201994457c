//! The prompt compilation engine.
//!
//! - [`template`]: parsing and rendering of `◄placeholder►` markup
//! - [`source`]: the pluggable source contract
//! - [`compiler`]: dependency discovery and topological rendering
//! - [`sources`]: built-in sources

pub mod compiler;
pub mod source;
pub mod sources;
pub mod template;

pub use compiler::{CompilePrompt, PromptCompiler, ResolvedTemplate};
pub use source::{DynTemplateSource, TemplateSource, TemplateSourceDyn, dyn_source};
pub use template::{Placeholder, Template};

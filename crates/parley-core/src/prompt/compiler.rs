//! Prompt compilation: dependency discovery, cycle handling, and rendering.
//!
//! Compiling a root key runs in two phases over a context created fresh for
//! the call:
//!
//! 1. **Discovery** walks placeholder references breadth-first, resolving
//!    each key through the registered sources exactly once and recording the
//!    dependency graph.
//! 2. **Render** applies Kahn's algorithm: templates whose dependencies are
//!    all compiled are rendered, which in turn unblocks their dependents.
//!
//! The ready set for phase 2 is recomputed from the dependency map after
//! discovery finishes, so the order in which a leaf is discovered relative
//! to the keys that reference it never matters.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use parley_types::error::{PromptError, SourceError, TemplateError};
use parley_types::prompt::SourcePrecedence;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tokio_util::sync::CancellationToken;

use super::source::DynTemplateSource;
use super::sources::dictionary::DictionaryTemplateSource;
use super::template::Template;

/// Diagnostic name of the per-call override source.
pub const OVERRIDES_SOURCE_NAME: &str = "overrides";

/// Anything that can turn a root key into a fully rendered prompt.
pub trait CompilePrompt: Send + Sync {
    /// Compile `key` into its rendered text.
    ///
    /// `overrides` supplies per-call values that take precedence over every
    /// registered source for colliding keys.
    fn compile_prompt(
        &self,
        key: &str,
        overrides: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, PromptError>> + Send;
}

/// A template together with the source that served it.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub source_name: String,
    pub template: Template,
}

/// Compiles prompts from an ordered chain of template sources.
///
/// Holds only an immutable list of sources; concurrent compile calls share
/// nothing mutable.
#[derive(Clone)]
pub struct PromptCompiler {
    sources: Arc<[DynTemplateSource]>,
    precedence: SourcePrecedence,
}

impl PromptCompiler {
    /// Create a compiler over `sources` in registration order, using the
    /// default [`SourcePrecedence`].
    pub fn new(sources: Vec<DynTemplateSource>) -> Self {
        Self {
            sources: sources.into(),
            precedence: SourcePrecedence::default(),
        }
    }

    pub fn with_precedence(mut self, precedence: SourcePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn precedence(&self) -> SourcePrecedence {
        self.precedence
    }

    /// Names of the registered sources, in registration order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Find which source would serve `key` and parse its template.
    ///
    /// Returns `Ok(None)` when no registered source holds the key.
    pub async fn locate(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedTemplate>, PromptError> {
        self.resolve(&self.sources, key, key, cancel).await
    }

    /// Compile `root` into its fully rendered text.
    #[tracing::instrument(
        name = "compile_prompt",
        skip(self, overrides, cancel),
        fields(key = %root, precedence = %self.precedence)
    )]
    pub async fn compile(
        &self,
        root: &str,
        overrides: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<String, PromptError> {
        let started = Instant::now();
        let sources = self.effective_sources(overrides);

        let mut ctx = CompilationContext::default();
        self.discover(&sources, root, &mut ctx, cancel).await?;

        let frontier = ctx.frontier();
        if frontier.is_empty() {
            return Err(PromptError::CircularOrUnsatisfiableDependency {
                key: root.to_string(),
                detail: ctx.describe_unsatisfiable(),
            });
        }

        ctx.render(frontier)?;

        let template_count = ctx.templates.len();
        let Some(prompt) = ctx.compiled.remove(root) else {
            let pending = ctx.pending();
            tracing::warn!(
                pending = ?pending,
                missing = ?ctx.missing,
                "Template could not be resolved"
            );
            return Err(PromptError::UnresolvedTemplate {
                key: root.to_string(),
                pending,
                missing: ctx.missing.into_iter().collect(),
            });
        };

        tracing::info!(
            templates = template_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            length = prompt.len(),
            "Prompt compiled"
        );
        Ok(prompt)
    }

    /// The registered chain plus, when present, the override dictionary at
    /// the highest-priority end for the active precedence.
    fn effective_sources(
        &self,
        overrides: Option<&HashMap<String, String>>,
    ) -> Vec<DynTemplateSource> {
        let mut sources: Vec<DynTemplateSource> = self.sources.to_vec();
        if let Some(values) = overrides.filter(|v| !v.is_empty()) {
            let overrides: DynTemplateSource = Arc::new(DictionaryTemplateSource::named(
                OVERRIDES_SOURCE_NAME,
                values.clone(),
            ));
            match self.precedence {
                SourcePrecedence::LastRegisteredWins => sources.push(overrides),
                SourcePrecedence::FirstRegisteredWins => sources.insert(0, overrides),
            }
        }
        sources
    }

    /// Phase A: breadth-first walk of placeholder references from `root`.
    async fn discover(
        &self,
        sources: &[DynTemplateSource],
        root: &str,
        ctx: &mut CompilationContext,
        cancel: &CancellationToken,
    ) -> Result<(), PromptError> {
        let mut queue = VecDeque::from([root.to_string()]);

        while let Some(key) = queue.pop_front() {
            if !ctx.visited.insert(key.clone()) {
                continue;
            }
            tracing::debug!(key = %key, "Processing template");

            let Some(resolved) = self.resolve(sources, root, &key, cancel).await? else {
                tracing::debug!(key = %key, "Template not found in any source");
                ctx.missing.insert(key);
                continue;
            };
            tracing::debug!(key = %key, source = %resolved.source_name, "Template loaded");

            let references = resolved.template.placeholder_names();
            for dependency in &references {
                ctx.dependents
                    .entry(dependency.clone())
                    .or_default()
                    .insert(key.clone());
                queue.push_back(dependency.clone());
            }
            ctx.dependencies.insert(key.clone(), references);
            ctx.templates.insert(key, resolved.template);
        }

        Ok(())
    }

    /// Pick the serving source for `key` per the precedence policy, fetch its
    /// raw markup, and parse it.
    ///
    /// Under [`SourcePrecedence::LastRegisteredWins`] every source reporting
    /// the key is fetched and parsed in registration order and the last one
    /// is kept, so a malformed template in a shadowed source still fails the
    /// call. Under [`SourcePrecedence::FirstRegisteredWins`] probing stops at
    /// the first hit and only that source is fetched.
    async fn resolve(
        &self,
        sources: &[DynTemplateSource],
        root: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedTemplate>, PromptError> {
        let holders: Vec<&DynTemplateSource> = match self.precedence {
            SourcePrecedence::LastRegisteredWins => {
                let probes = sources.iter().map(|source| async move {
                    source
                        .has_key_boxed(key)
                        .await
                        .map_err(|e| source_failure(root, key, source.name(), e))
                });
                // try_join_all keeps input order, so completion order never
                // decides the winner.
                let hits = until_cancelled(cancel, root, try_join_all(probes)).await?;
                sources
                    .iter()
                    .zip(hits)
                    .filter_map(|(source, hit)| hit.then_some(source))
                    .collect()
            }
            SourcePrecedence::FirstRegisteredWins => {
                let mut found = Vec::new();
                for source in sources {
                    let probe = async {
                        source
                            .has_key_boxed(key)
                            .await
                            .map_err(|e| source_failure(root, key, source.name(), e))
                    };
                    if until_cancelled(cancel, root, probe).await? {
                        found.push(source);
                        break;
                    }
                }
                found
            }
        };

        let mut resolved = None;
        for source in holders {
            let fetch = async {
                source
                    .get_value_boxed(key, cancel)
                    .await
                    .map_err(|e| source_failure(root, key, source.name(), e))
            };
            let raw = until_cancelled(cancel, root, fetch).await?;
            let template = Template::parse(raw).map_err(|e| template_failure(key, e))?;
            if resolved.is_some() {
                tracing::trace!(key = %key, source = %source.name(), "Template replaces earlier source");
            }
            resolved = Some(ResolvedTemplate {
                source_name: source.name().to_string(),
                template,
            });
        }

        Ok(resolved)
    }
}

impl CompilePrompt for PromptCompiler {
    async fn compile_prompt(
        &self,
        key: &str,
        overrides: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<String, PromptError> {
        self.compile(key, overrides, cancel).await
    }
}

/// Per-call working state. Never shared between calls.
#[derive(Default)]
struct CompilationContext {
    /// Outstanding dependencies of each found key.
    dependencies: HashMap<String, BTreeSet<String>>,
    /// Keys that reference each key.
    dependents: HashMap<String, BTreeSet<String>>,
    templates: HashMap<String, Template>,
    compiled: HashMap<String, String>,
    visited: HashSet<String>,
    missing: BTreeSet<String>,
}

impl CompilationContext {
    /// Keys whose dependency set is empty, sorted.
    fn frontier(&self) -> Vec<String> {
        let mut ready: Vec<String> = self
            .dependencies
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        ready.sort();
        ready
    }

    /// Phase B: Kahn's algorithm seeded from `frontier`.
    fn render(&mut self, frontier: Vec<String>) -> Result<(), PromptError> {
        let mut queue = VecDeque::from(frontier);

        while let Some(key) = queue.pop_front() {
            let rendered = self.templates[&key]
                .render(&self.compiled)
                .map_err(|e| template_failure(&key, e))?;
            tracing::debug!(key = %key, length = rendered.len(), "Template compiled");
            self.compiled.insert(key.clone(), rendered);

            let Some(dependents) = self.dependents.get(&key) else {
                continue;
            };
            for dependent in dependents {
                if let Some(outstanding) = self.dependencies.get_mut(dependent) {
                    outstanding.remove(&key);
                    if outstanding.is_empty() {
                        queue.push_back(dependent.clone());
                    }
                }
            }
        }

        Ok(())
    }

    /// Found keys that never became renderable, sorted.
    fn pending(&self) -> Vec<String> {
        let mut pending: Vec<String> = self
            .templates
            .keys()
            .filter(|key| !self.compiled.contains_key(*key))
            .cloned()
            .collect();
        pending.sort();
        pending
    }

    /// Best-effort reason no key is renderable.
    fn describe_unsatisfiable(&self) -> Option<String> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes = HashMap::new();
        for key in self.dependencies.keys() {
            nodes.insert(key.as_str(), graph.add_node(key.as_str()));
        }
        for (key, deps) in &self.dependencies {
            for dep in deps {
                if let Some(&to) = nodes.get(dep.as_str()) {
                    graph.add_edge(nodes[key.as_str()], to, ());
                }
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Some(format!(
                "cycle detected involving '{}'",
                graph[cycle.node_id()]
            ));
        }
        if !self.missing.is_empty() {
            let missing: Vec<&str> = self.missing.iter().map(String::as_str).collect();
            return Some(format!("not found in any source: {}", missing.join(", ")));
        }
        None
    }
}

/// Race `fut` against cancellation of the call.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    root: &str,
    fut: impl Future<Output = Result<T, PromptError>>,
) -> Result<T, PromptError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PromptError::Cancelled { key: root.to_string() }),
        result = fut => result,
    }
}

fn source_failure(root: &str, key: &str, source_name: &str, err: SourceError) -> PromptError {
    match err {
        SourceError::Cancelled => PromptError::Cancelled {
            key: root.to_string(),
        },
        other => PromptError::Source {
            key: key.to_string(),
            source_name: source_name.to_string(),
            message: other.to_string(),
        },
    }
}

fn template_failure(key: &str, err: TemplateError) -> PromptError {
    match err {
        TemplateError::UnmatchedStartMarker { position } => PromptError::MalformedTemplate {
            key: key.to_string(),
            position,
        },
        TemplateError::MissingValues { names } => {
            tracing::error!(key = %key, missing = ?names, "Rendered template before its dependencies");
            PromptError::MissingPlaceholderValue {
                key: key.to_string(),
                missing: names,
            }
        }
    }
}

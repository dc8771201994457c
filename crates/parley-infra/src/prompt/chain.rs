//! Source-chain wiring.
//!
//! Registration order, lowest to highest priority under the default
//! last-registered-wins policy:
//!
//! 1. template files (`{templates_dir}/{key}.md`)
//! 2. application version
//! 3. inline prompts and the per-chat user introduction
//! 4. chat authorization guard (when configured)
//! 5. active model info
//! 6. conversation-backed sources supplied by the caller
//!
//! Inline configuration therefore overrides the shipped template files. This
//! inverts the earlier layering, which registered template files last so that
//! files shadowed inline prompts.

use std::collections::HashMap;
use std::sync::Arc;

use parley_core::chat::authorization::PromptDefinedAuthorization;
use parley_core::chat::context::UserMessageContext;
use parley_core::chat::conversation::CurrentConversation;
use parley_core::prompt::compiler::PromptCompiler;
use parley_core::prompt::source::{DynTemplateSource, dyn_source};
use parley_core::prompt::sources::authorization::ChatAuthorizationTemplateSource;
use parley_core::prompt::sources::dictionary::DictionaryTemplateSource;
use parley_core::prompt::sources::learned_profile::LearnedUserProfileTemplateSource;
use parley_core::prompt::sources::llm_info::LlmInfoTemplateSource;
use parley_core::prompt::sources::prior_conversations::PriorConversationsTemplateSource;
use parley_core::prompt::sources::recent_messages::RecentMessagesTemplateSource;
use parley_core::prompt::sources::user_specific::UserSpecificTemplateSource;
use parley_core::repository::embedding::{EmbeddingLookup, TextEmbedder};
use parley_core::repository::summary::SummaryStorage;
use parley_types::config::Settings;

use super::build_info::version_source;
use super::file::FileTemplateSource;

/// Build the configured source chain for one turn.
///
/// `extra` sources are appended after the configured ones, in order.
pub fn build_template_sources(
    settings: &Settings,
    context: Arc<UserMessageContext>,
    extra: Vec<DynTemplateSource>,
) -> Vec<DynTemplateSource> {
    let prompts = &settings.prompts;
    let mut sources: Vec<DynTemplateSource> = vec![
        dyn_source(FileTemplateSource::new(&prompts.templates_dir)),
        dyn_source(version_source()),
    ];

    if !prompts.inline.is_empty() {
        let inline: Arc<HashMap<String, String>> = Arc::new(prompts.inline.clone());
        sources.push(dyn_source(DictionaryTemplateSource::named(
            "inline",
            prompts.inline.clone(),
        )));
        sources.push(dyn_source(UserSpecificTemplateSource::new(
            inline,
            Arc::clone(&context),
        )));
    }

    if let Some(authorization) = &prompts.authorization {
        let chats = PromptDefinedAuthorization::new(
            prompts.inline.keys(),
            &prompts.authorized_chat_prefix,
        );
        tracing::debug!(authorized_chats = chats.authorized_chats(), "Chat authorization configured");
        sources.push(dyn_source(ChatAuthorizationTemplateSource::new(
            Arc::new(chats),
            authorization.clone(),
            Arc::clone(&context),
        )));
    }

    sources.push(dyn_source(LlmInfoTemplateSource::new(context)));
    sources.extend(extra);

    tracing::debug!(
        sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "Template sources registered"
    );
    sources
}

/// Build a compiler over the configured chain with the configured precedence.
pub fn build_compiler(
    settings: &Settings,
    context: Arc<UserMessageContext>,
    extra: Vec<DynTemplateSource>,
) -> PromptCompiler {
    PromptCompiler::new(build_template_sources(settings, context, extra))
        .with_precedence(settings.prompts.precedence)
}

/// Recent-messages and learned-profile sources backed by chat storage.
pub fn conversation_sources<C, S>(
    settings: &Settings,
    context: Arc<UserMessageContext>,
    conversation: Arc<C>,
    summaries: Arc<S>,
) -> Vec<DynTemplateSource>
where
    C: CurrentConversation + 'static,
    S: SummaryStorage + 'static,
{
    let properties = settings
        .conversation_processing
        .user_profile_properties
        .keys()
        .cloned()
        .collect();
    vec![
        dyn_source(RecentMessagesTemplateSource::new(conversation, Arc::clone(&context))),
        dyn_source(LearnedUserProfileTemplateSource::new(summaries, properties, context)),
    ]
}

/// Prior-conversation retrieval, when enabled in settings.
pub fn prior_conversations_source<C, E, L>(
    settings: &Settings,
    context: Arc<UserMessageContext>,
    conversation: Arc<C>,
    embedder: Arc<E>,
    lookup: Arc<L>,
) -> Option<DynTemplateSource>
where
    C: CurrentConversation + 'static,
    E: TextEmbedder + 'static,
    L: EmbeddingLookup + 'static,
{
    if !settings.conversation_processing.enable_summary_rag {
        return None;
    }
    Some(dyn_source(PriorConversationsTemplateSource::new(
        conversation,
        embedder,
        lookup,
        context,
    )))
}

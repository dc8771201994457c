//! Model-specific rendering of a conversation into chat-template markup.
//!
//! Each model family expects its own turn delimiters. A formatter turns an
//! ordered list of messages into that markup and can append a reply primer
//! (an open assistant turn) so the model continues as the bot.

use chrono::{DateTime, Utc};
use parley_types::chat::{Author, Message, format_timestamp};
use parley_types::llm::TextCompletionModel;

/// Renders messages in the prompt format of one model family.
pub trait ConversationFormatter: Send + Sync {
    fn format_conversation(&self, messages: &[Message], add_response_primer: bool) -> String;
}

fn role(author: Author) -> &'static str {
    match author {
        Author::User => "user",
        Author::Bot => "assistant",
    }
}

/// Llama 3 header/eot markup.
pub struct Llama3Formatter {
    now: DateTime<Utc>,
}

impl Llama3Formatter {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl ConversationFormatter for Llama3Formatter {
    fn format_conversation(&self, messages: &[Message], add_response_primer: bool) -> String {
        let mut out = String::new();
        for message in messages {
            out.push_str(&format!(
                "<|start_header_id|>{} at {}<|end_header_id|>\n\n{}<|eot_id|>",
                role(message.author),
                format_timestamp(&message.timestamp),
                message.content
            ));
        }
        if add_response_primer {
            out.push_str(&format!(
                "<|start_header_id|>assistant at {}<|end_header_id|>\n\n",
                format_timestamp(&self.now)
            ));
        }
        out
    }
}

/// Qwen 2 ChatML markup.
pub struct Qwen2Formatter {
    now: DateTime<Utc>,
}

impl Qwen2Formatter {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl ConversationFormatter for Qwen2Formatter {
    fn format_conversation(&self, messages: &[Message], add_response_primer: bool) -> String {
        let mut out = String::new();
        for message in messages {
            out.push_str(&format!(
                "<|im_start|>{} at {}\n{}<|im_end|>\n",
                role(message.author),
                format_timestamp(&message.timestamp),
                message.content
            ));
        }
        if add_response_primer {
            out.push_str(&format!(
                "<|im_start|>assistant at {}\n",
                format_timestamp(&self.now)
            ));
        }
        out
    }
}

/// Pick the formatter matching `model`'s prompt format.
pub fn formatter_for(model: TextCompletionModel, now: DateTime<Utc>) -> Box<dyn ConversationFormatter> {
    match model {
        TextCompletionModel::Llama3_8BInstruct | TextCompletionModel::Llama3_70BInstruct => {
            Box::new(Llama3Formatter::new(now))
        }
        TextCompletionModel::Qwen2_72BInstruct => Box::new(Qwen2Formatter::new(now)),
    }
}

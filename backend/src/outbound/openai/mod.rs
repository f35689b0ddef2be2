//! OpenAI chat-completions adapter for the `CopyRewriter` port.

mod dto;
mod http_rewriter;

pub use http_rewriter::{
    DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, OpenAiRewriter, RewriterConfig,
};

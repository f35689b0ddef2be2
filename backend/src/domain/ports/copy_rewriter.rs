//! Port for the AI copy rewriting service.
//!
//! The service is an opaque text transform: it receives a chat-style prompt
//! and answers with rewritten text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;

define_port_error! {
    /// Errors raised by copy rewriter adapters.
    pub enum CopyRewriterError {
        /// No rewriting backend is configured.
        Unconfigured { message: String } =>
            "copy rewriting is not configured: {message}",
        /// The request could not be delivered.
        Transport { message: String } =>
            "copy rewriter transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } =>
            "copy rewriter timed out: {message}",
        /// The service refused the request.
        Rejected { message: String } =>
            "copy rewriter rejected the request: {message}",
        /// The service answered with an unreadable payload.
        Decode { message: String } =>
            "copy rewriter response could not be decoded: {message}",
    }
}

/// Author of one prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// Instructions for the model.
    System,
    /// Text supplied by the editor.
    User,
}

/// One message of a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who is speaking.
    pub role: PromptRole,
    /// Message text.
    pub content: String,
}

impl PromptMessage {
    /// System message with `content`.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    /// User message with `content`.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// Port for rewriting copy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CopyRewriter: Send + Sync {
    /// Run the prompt and return the rewritten text.
    async fn rewrite(&self, prompt: &[PromptMessage]) -> Result<String, CopyRewriterError>;
}

/// Rewriter used when no API key is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredCopyRewriter;

#[async_trait]
impl CopyRewriter for UnconfiguredCopyRewriter {
    async fn rewrite(&self, _prompt: &[PromptMessage]) -> Result<String, CopyRewriterError> {
        Err(CopyRewriterError::unconfigured(
            "set PAGEBIND_OPENAI_API_KEY to enable rewriting",
        ))
    }
}

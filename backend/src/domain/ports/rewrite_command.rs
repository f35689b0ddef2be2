//! Driving port for AI copy rewriting.

use async_trait::async_trait;

use crate::domain::Error;

/// Text to rewrite and the section it will be placed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    /// Copy to rewrite.
    pub text: String,
    /// Section the copy is meant for, e.g. `title`.
    pub section: String,
}

/// Driving port for AI copy rewrites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewriteCommand: Send + Sync {
    /// Rewrite `request.text` for its section.
    async fn rewrite(&self, request: RewriteRequest) -> Result<String, Error>;
}

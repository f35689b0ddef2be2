//! AI copy rewriting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    CopyRewriter, CopyRewriterError, PromptMessage, RewriteCommand, RewriteRequest,
};
use crate::domain::Error;

const SHORT_SECTIONS: [&str; 2] = ["title", "question"];
const SHORT_RULE: &str = "Keep content length only 5 words maximum. Never go over 5 words.";
const LONG_RULE: &str = "Keep content length only 25 words maximum. Never go over 25 words.";

const GUIDANCE: &str = "Reply only and follow the provided instructions, do not expose that you \
are an AI model. {section}. If the text is empty, provide generic hotel text as reply. Follow \
SEO best practices. Add a human touch to the text.";
const BASE_TEXT: &str = "Hotel related text and the text that needs to be used as base is the \
following; improve or extend it according to your knowledge of the area or text: {text}.";

/// Length rule for the section the copy will be placed in.
#[must_use]
pub fn length_rule(section: &str) -> &'static str {
    if SHORT_SECTIONS.contains(&section) {
        SHORT_RULE
    } else {
        LONG_RULE
    }
}

/// Prompt for rewriting `request.text`: guidance, base text, guidance again.
#[must_use]
pub fn build_prompt(request: &RewriteRequest) -> Vec<PromptMessage> {
    let fill = |template: &str| {
        template
            .replace("{section}", length_rule(&request.section))
            .replace("{text}", &request.text)
    };
    vec![
        PromptMessage::system(fill(GUIDANCE)),
        PromptMessage::user(fill(BASE_TEXT)),
        PromptMessage::system(fill(GUIDANCE)),
    ]
}

/// [`RewriteCommand`] backed by a [`CopyRewriter`].
pub struct RewriteService<C: ?Sized> {
    rewriter: Arc<C>,
}

impl<C: ?Sized> RewriteService<C> {
    /// Service delegating to `rewriter`.
    #[must_use]
    pub fn new(rewriter: Arc<C>) -> Self {
        Self { rewriter }
    }
}

#[async_trait]
impl<C> RewriteCommand for RewriteService<C>
where
    C: CopyRewriter + ?Sized,
{
    async fn rewrite(&self, request: RewriteRequest) -> Result<String, Error> {
        if request.text.trim().is_empty() || request.section.trim().is_empty() {
            return Err(Error::invalid_request("text and section are required"));
        }
        let prompt = build_prompt(&request);
        debug!(section = %request.section, "requesting copy rewrite");
        self.rewriter.rewrite(&prompt).await.map_err(|error| {
            warn!(%error, operation = "rewrite", section = %request.section, "copy rewrite failed");
            match error {
                CopyRewriterError::Unconfigured { message } => Error::upstream(message),
                other => Error::upstream(format!("copy rewrite failed: {other}")),
            }
        })
    }
}

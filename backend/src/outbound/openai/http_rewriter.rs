//! Reqwest-backed copy rewriter.
//!
//! Owns transport details only: request serialisation, bearer auth, the
//! request timeout, HTTP error mapping and decoding the first choice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{ChatRequestDto, ChatResponseDto};
use crate::domain::ports::{CopyRewriter, CopyRewriterError, PromptMessage};
use crate::outbound::http_support::status_message;

/// Chat completions endpoint used unless overridden.
pub const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Model used unless overridden.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Upper bound for one rewrite; completions are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Settings for [`OpenAiRewriter`].
#[derive(Debug, Clone)]
pub struct RewriterConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model name sent with each request.
    pub model: String,
    /// Chat completions endpoint.
    pub endpoint: Url,
    /// Request timeout.
    pub timeout: Duration,
}

impl RewriterConfig {
    /// Default endpoint, model and timeout for `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the built-in endpoint fails to parse.
    pub fn new(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            endpoint: Url::parse(DEFAULT_CHAT_COMPLETIONS_URL)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Use `model` instead of [`DEFAULT_MODEL`].
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// [`CopyRewriter`] calling the chat-completions API.
pub struct OpenAiRewriter {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiRewriter")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiRewriter {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: RewriterConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            model: config.model,
        })
    }
}

#[async_trait]
impl CopyRewriter for OpenAiRewriter {
    async fn rewrite(&self, prompt: &[PromptMessage]) -> Result<String, CopyRewriterError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&ChatRequestDto {
                model: &self.model,
                messages: prompt,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_text(body.as_ref())
    }
}

fn parse_text(body: &[u8]) -> Result<String, CopyRewriterError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        CopyRewriterError::decode(format!("invalid chat completion payload: {error}"))
    })?;
    decoded.into_text().map_err(CopyRewriterError::decode)
}

fn map_transport_error(error: reqwest::Error) -> CopyRewriterError {
    if error.is_timeout() {
        CopyRewriterError::timeout(error.to_string())
    } else {
        CopyRewriterError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CopyRewriterError {
    let message = status_message(status, body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CopyRewriterError::timeout(message)
        }
        _ if status.is_client_error() => CopyRewriterError::rejected(message),
        _ => CopyRewriterError::transport(message),
    }
}

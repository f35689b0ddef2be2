//! Pipeline error payload shared by every driving port.
//!
//! Adapters decide how a [`ErrorCode`] is surfaced; the domain only records
//! the category, a message, optional structured details and the trace id that
//! was in scope when the failure was raised.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

use crate::domain::TraceId;

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

const FALLBACK_MESSAGE: &str = "unspecified error";

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Missing or malformed input.
    InvalidRequest,
    /// No tenant record, template or artifact for the request.
    NotFound,
    /// The record store, blob store, mapper or rewriter failed.
    UpstreamFailure,
    /// A stored document is not usable HTML.
    ParseFailure,
    /// An unexpected failure inside the service.
    InternalError,
}

impl ErrorCode {
    /// Whether the failure text may leak store or vendor internals.
    #[must_use]
    pub const fn is_server_side(self) -> bool {
        matches!(self, Self::UpstreamFailure | Self::InternalError)
    }
}

/// Reasons an [`Error`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorValidationError {
    /// The message was empty or whitespace.
    #[error("error message must not be empty")]
    EmptyMessage,
}

/// Domain error.
///
/// The message is never blank; [`Error::new`] substitutes a placeholder and
/// deserialisation rejects blank messages.
///
/// # Examples
/// ```
/// use pagebind::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("tenant 7 has no record");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ThisError)]
#[error("{message}")]
#[serde(rename_all = "camelCase", try_from = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error, falling back to a placeholder for blank messages.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self::unchecked(code, FALLBACK_MESSAGE))
    }

    /// # Errors
    ///
    /// [`ErrorValidationError::EmptyMessage`] when `message` is blank.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self::unchecked(code, message))
    }

    fn unchecked(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Failure category.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trace id in scope when the error was built.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured details, such as the offending field.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details, e.g. the offending field or keys.
    ///
    /// ```
    /// use pagebind::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "clientId" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the request trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Same code and trace id with `message` in place of the original text
    /// and no details.
    #[must_use]
    pub fn redacted(&self, message: &str) -> Self {
        Self {
            code: self.code,
            message: message.to_owned(),
            trace_id: self.trace_id.clone(),
            details: None,
        }
    }

    /// Malformed or missing request input.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Tenant, document or blob does not exist.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// A store or remote service failed.
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamFailure, message)
    }

    /// A document or payload could not be parsed.
    #[must_use]
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseFailure, message)
    }

    /// Unexpected server-side failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Wire shape accepted when decoding an [`Error`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(dto: ErrorDto) -> Result<Self, Self::Error> {
        let mut error = Self::try_new(dto.code, dto.message)?;
        error.trace_id = dto.trace_id;
        error.details = dto.details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests;

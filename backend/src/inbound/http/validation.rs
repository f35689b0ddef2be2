//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive from a browser editor that sends `clientId` either as
//! a JSON number or a string, so identifiers are parsed here rather than by
//! serde.

use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{DocumentName, Error, TenantId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidTenantId,
    UnknownDocument,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidTenantId => "invalid_tenant_id",
            ErrorCode::UnknownDocument => "unknown_document",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const CLIENT_ID: FieldName = FieldName::new("clientId");
pub(crate) const TARGET_FILE: FieldName = FieldName::new("targetFile");

/// Tenant identifier as sent by clients: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ClientIdInput {
    /// JSON number.
    Number(u64),
    /// Numeric string.
    Text(String),
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

fn invalid_value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_tenant_id(value: Option<ClientIdInput>) -> Result<TenantId, Error> {
    match value.ok_or_else(|| missing_field_error(CLIENT_ID))? {
        ClientIdInput::Number(raw) => Ok(TenantId::new(raw)),
        ClientIdInput::Text(raw) => raw.parse().map_err(|_| {
            invalid_value_error(
                CLIENT_ID,
                ErrorCode::InvalidTenantId,
                format!("{} must be a non-negative integer", CLIENT_ID.as_str()),
                &raw,
            )
        }),
    }
}

pub(crate) fn parse_document(value: Option<String>) -> Result<DocumentName, Error> {
    let raw = value.ok_or_else(|| missing_field_error(TARGET_FILE))?;
    raw.parse().map_err(|_| {
        invalid_value_error(
            TARGET_FILE,
            ErrorCode::UnknownDocument,
            format!(
                "{} must be one of index.html, sms.html or email.html",
                TARGET_FILE.as_str()
            ),
            &raw,
        )
    })
}

/// Reject absent or whitespace-only text fields.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

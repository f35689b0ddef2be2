//! Remote selector mapping service client.
//!
//! POSTs `{clientId, targetFile}` and reads the mapping from the `message`
//! field of the answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{SectionMapper, SectionMapperError};
use crate::domain::{DocumentName, SectionMapping, TenantId};
use crate::outbound::http_support::status_message;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MappingRequestDto<'a> {
    client_id: u64,
    target_file: &'a str,
}

#[derive(Debug, Deserialize)]
struct MappingResponseDto {
    message: SectionMapping,
}

/// [`SectionMapper`] delegating to a remote mapping endpoint.
#[derive(Debug, Clone)]
pub struct HttpSectionMapper {
    client: Client,
    endpoint: Url,
}

impl HttpSectionMapper {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SectionMapper for HttpSectionMapper {
    async fn map_sections(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<SectionMapping, SectionMapperError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&MappingRequestDto {
                client_id: tenant_id.get(),
                target_file: document.file_name(),
            })
            .send()
            .await
            .map_err(|error| SectionMapperError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| SectionMapperError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_mapping(body.as_ref())
    }
}

fn parse_mapping(body: &[u8]) -> Result<SectionMapping, SectionMapperError> {
    serde_json::from_slice::<MappingResponseDto>(body)
        .map(|decoded| decoded.message)
        .map_err(|error| SectionMapperError::decode(format!("invalid mapping payload: {error}")))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SectionMapperError {
    let message = status_message(status, body);
    match status {
        StatusCode::NOT_FOUND => SectionMapperError::not_found(message),
        _ => SectionMapperError::upstream(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SectionKind;
    use rstest::rstest;

    #[rstest]
    fn request_uses_the_wire_field_names() {
        let body = serde_json::to_value(MappingRequestDto {
            client_id: 1,
            target_file: "index.html",
        })
        .expect("serialises");
        assert_eq!(body, serde_json::json!({"clientId": 1, "targetFile": "index.html"}));
    }

    #[rstest]
    fn reads_the_mapping_from_message() {
        let body = br##"{"message":{"#hero":{"type":"title","dbMap":"hero","show":true}}}"##;
        let mapping = parse_mapping(body).expect("decodes");
        let entry = &mapping["#hero"];
        assert_eq!(entry.kind, SectionKind::Title);
        assert_eq!(entry.db_map, "hero");
    }

    #[rstest]
    fn rejects_payloads_without_message() {
        assert!(matches!(
            parse_mapping(br#"{"mapping":{}}"#),
            Err(SectionMapperError::Decode { .. })
        ));
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, true)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn maps_statuses(#[case] status: StatusCode, #[case] not_found: bool) {
        let error = map_status_error(status, b"");
        assert_eq!(matches!(error, SectionMapperError::NotFound { .. }), not_found);
    }
}

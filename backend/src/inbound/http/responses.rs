//! JSON bodies shared by the document, publish and rewrite handlers.
//!
//! Every success body carries a `message`, the shape the browser editor reads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SectionMapping;

/// Plain `{message}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Outcome message.
    #[schema(example = "Updated successfully.")]
    pub message: String,
}

impl MessageResponse {
    /// Body carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by content updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateResponse {
    /// Outcome message.
    #[schema(example = "Updated successfully.")]
    pub message: String,
    /// Keys skipped because the document has no such section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Outcome of the re-render; present only when the server awaited it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<bool>,
}

/// Selector mapping wrapped in `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MappingResponse {
    /// Binding per selector.
    #[schema(value_type = Object)]
    pub message: SectionMapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn update_response_omits_unset_fields() {
        let body = UpdateResponse {
            message: "Updated successfully.".into(),
            skipped: Vec::new(),
            rendered: None,
        };
        assert_eq!(
            serde_json::to_value(body).expect("serialises"),
            json!({"message": "Updated successfully."})
        );
    }

    #[rstest]
    fn degraded_update_reports_the_failed_render() {
        let body = UpdateResponse {
            message: "Updated successfully.".into(),
            skipped: vec!["ghost".into()],
            rendered: Some(false),
        };
        assert_eq!(
            serde_json::to_value(body).expect("serialises"),
            json!({"message": "Updated successfully.", "skipped": ["ghost"], "rendered": false})
        );
    }
}

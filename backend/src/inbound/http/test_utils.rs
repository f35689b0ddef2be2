//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockDocumentCommand, MockDocumentQuery, MockPreviewQuery, MockPublishCommand,
    MockRewriteCommand,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mock doubles for every driving port. Unset expectations panic when hit.
#[derive(Default)]
pub struct MockPorts {
    /// Document retrieval mock.
    pub documents: MockDocumentQuery,
    /// Content command mock.
    pub content: MockDocumentCommand,
    /// Publish command mock.
    pub publisher: MockPublishCommand,
    /// Preview query mock.
    pub preview: MockPreviewQuery,
    /// Rewrite command mock.
    pub rewriter: MockRewriteCommand,
}

impl MockPorts {
    /// Wrap the mocks into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(self.into_ports()))
    }

    /// Box the mocks into handler ports.
    pub fn into_ports(self) -> HttpStatePorts {
        HttpStatePorts {
            documents: Arc::new(self.documents),
            content: Arc::new(self.content),
            publisher: Arc::new(self.publisher),
            preview: Arc::new(self.preview),
            rewriter: Arc::new(self.rewriter),
        }
    }
}
